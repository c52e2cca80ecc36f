use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

fn holder(ident: &Ident) -> Ident {
    format_ident!("__field_{}", ident)
}

/// Body of `Entity::from_row`: values are matched to fields by label, missing
/// passive fields decode as `NotSet`, any other missing column is an error.
pub(crate) fn from_row_body(table: &TableMetadata) -> TokenStream {
    let struct_name = &table.item.ident;
    let struct_name_str = struct_name.to_string();
    let holders = table.columns.iter().map(|c| {
        let holder = holder(&c.ident);
        let ty = &c.ty;
        quote!(let mut #holder: ::std::option::Option<#ty> = None;)
    });
    let arms = table.columns.iter().map(|c| {
        let holder = holder(&c.ident);
        let ty = &c.ty;
        let name = &c.name;
        quote! {
            #name => {
                #holder = Some(
                    <#ty as ::evalkit::AsValue>::try_from_value(__value__).with_context(|| {
                        format!("While decoding column `{}` of `{}`", #name, #struct_name_str)
                    })?,
                );
            }
        }
    });
    let assignments = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let holder = holder(ident);
        let name = &c.name;
        if c.passive {
            quote!(#ident: #holder.unwrap_or_default())
        } else {
            quote! {
                #ident: #holder.ok_or_else(|| ::evalkit::Error::msg(format!(
                    "Column `{}` does not exist in the row provided",
                    #name
                )))?
            }
        }
    });
    quote! {
        use ::evalkit::ErrorContext as _;
        #(#holders)*
        for (__name__, __value__) in ::std::iter::zip(row.labels.iter(), row.values.into_vec()) {
            match __name__.as_str() {
                #(#arms)*
                _ => {}
            }
        }
        Ok(#struct_name {
            #(#assignments,)*
        })
    }
}
