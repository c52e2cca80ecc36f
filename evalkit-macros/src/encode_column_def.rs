use crate::decode_column::ColumnMetadata;
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn encode_column_ref(metadata: &ColumnMetadata, table: &str, schema: &str) -> TokenStream {
    let name = &metadata.name;
    quote! {
        ::evalkit::ColumnRef::new(#name, #table, #schema)
    }
}

pub(crate) fn encode_column_def(metadata: &ColumnMetadata, column_ref: TokenStream) -> TokenStream {
    let column_type = &metadata.column_type;
    let value = &metadata.value;
    let nullable = metadata.nullable;
    let default = metadata
        .default
        .as_ref()
        .map_or(quote!(None), |v| quote!(Some(#v)));
    let primary_key = &metadata.primary_key;
    let unique = metadata.unique;
    let auto_increment = metadata.auto_increment;
    let updated_at = metadata.updated_at;
    let references = metadata
        .references
        .as_ref()
        .map_or(quote!(None), |v| quote!(Some(#v)));
    let on_delete = metadata
        .on_delete
        .as_ref()
        .map_or(quote!(None), |v| quote!(Some(#v)));
    let on_update = metadata
        .on_update
        .as_ref()
        .map_or(quote!(None), |v| quote!(Some(#v)));
    let passive = metadata.passive;
    quote! {
        ::evalkit::ColumnDef {
            column_ref: #column_ref,
            column_type: #column_type,
            value: #value,
            nullable: #nullable,
            default: #default,
            primary_key: #primary_key,
            unique: #unique,
            auto_increment: #auto_increment,
            updated_at: #updated_at,
            references: #references,
            on_delete: #on_delete,
            on_update: #on_update,
            passive: #passive,
        }
    }
}
