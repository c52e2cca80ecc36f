mod decode_column;
mod decode_table;
mod encode_column_def;
mod from_row;
mod unique_enum;

use decode_table::{TableMetadata, decode_table};
use encode_column_def::{encode_column_def, encode_column_ref};
use from_row::from_row_body;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};
use unique_enum::{unique_enum, unique_enum_name, unique_key_body};

/// Maps a struct to a table.
///
/// ```rust,ignore
/// #[derive(Entity)]
/// #[evalkit(primary_key = (Self::student_id, Self::subject_id))]
/// pub struct StudentSubject {
///     #[evalkit(references = Student::id, on_delete = "cascade")]
///     pub student_id: i32,
///     #[evalkit(references = Subject::id, on_delete = "cascade")]
///     pub subject_id: i32,
///     #[evalkit(default = "CURRENT_TIMESTAMP")]
///     pub assigned_at: Passive<PrimitiveDateTime>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(evalkit))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    match decode_table(item) {
        Ok(table) => encode_entity(&table).into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn encode_entity(table: &TableMetadata) -> proc_macro2::TokenStream {
    let struct_name = &table.item.ident;
    let table_name = &table.name;
    let schema_name = &table.schema;
    let unique_name = unique_enum_name(table);
    let unique_enum = unique_enum(table);
    let column_consts = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let column_ref = encode_column_ref(c, table_name, schema_name);
        quote! {
            #[allow(non_upper_case_globals)]
            pub const #ident: ::evalkit::ColumnRef = #column_ref;
        }
    });
    let columns_defs = table.columns.iter().map(|c| {
        let ident = &c.ident;
        encode_column_def(c, quote!(#struct_name::#ident))
    });
    let primary_key_defs = table.primary_key.iter().map(|i| quote!(&columns[#i]));
    let unique_defs = table.unique.iter().map(|set| {
        let members = set.iter().map(|i| quote!(&columns[#i]));
        quote!(vec![#(#members),*].into_boxed_slice())
    });
    let row_filtered = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let name = &c.name;
        let value = quote! {
            (#name, ::evalkit::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        };
        if c.passive {
            quote! {
                if self.#ident.is_set() {
                    fields.push(#value);
                }
            }
        } else {
            quote!(fields.push(#value);)
        }
    });
    let row_full = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let name = &c.name;
        quote! {
            (#name, ::evalkit::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let columns_count = table.columns.len();
    let from_row = from_row_body(table);
    let unique_key = unique_key_body(table);
    quote! {
        impl #struct_name {
            #(#column_consts)*
        }

        #unique_enum

        impl ::evalkit::Entity for #struct_name {
            type Unique = #unique_name;

            fn table_ref() -> &'static ::evalkit::TableRef {
                static TABLE_REF: ::evalkit::TableRef = ::evalkit::TableRef {
                    name: #table_name,
                    schema: #schema_name,
                    alias: "",
                };
                &TABLE_REF
            }

            fn columns() -> &'static [::evalkit::ColumnDef] {
                static RESULT: ::std::sync::LazyLock<Box<[::evalkit::ColumnDef]>> =
                    ::std::sync::LazyLock::new(|| vec![#(#columns_defs),*].into_boxed_slice());
                &RESULT
            }

            fn primary_key_def() -> &'static [&'static ::evalkit::ColumnDef] {
                static RESULT: ::std::sync::LazyLock<Box<[&'static ::evalkit::ColumnDef]>> =
                    ::std::sync::LazyLock::new(|| {
                        #[allow(unused_variables)]
                        let columns = <#struct_name as ::evalkit::Entity>::columns();
                        vec![#(#primary_key_defs),*].into_boxed_slice()
                    });
                &RESULT
            }

            fn unique_defs() -> &'static [Box<[&'static ::evalkit::ColumnDef]>] {
                static RESULT: ::std::sync::LazyLock<Box<[Box<[&'static ::evalkit::ColumnDef]>]>> =
                    ::std::sync::LazyLock::new(|| {
                        #[allow(unused_variables)]
                        let columns = <#struct_name as ::evalkit::Entity>::columns();
                        vec![#(#unique_defs),*].into_boxed_slice()
                    });
                &RESULT
            }

            fn from_row(row: ::evalkit::RowLabeled) -> ::evalkit::Result<Self> {
                #from_row
            }

            fn row_filtered(&self) -> ::evalkit::RowFields {
                let mut fields = Vec::with_capacity(#columns_count);
                #(#row_filtered)*
                fields.into_boxed_slice()
            }

            fn row_full(&self) -> ::evalkit::RowFields {
                vec![#(#row_full),*].into_boxed_slice()
            }

            fn unique_key(&self) -> ::evalkit::Result<Self::Unique> {
                #unique_key
            }
        }
    }
}
