use crate::{decode_column::ColumnMetadata, decode_table::TableMetadata};
use convert_case::{Case, Casing};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::Ident;

pub(crate) fn unique_enum_name(table: &TableMetadata) -> Ident {
    format_ident!("{}Unique", table.item.ident)
}

fn variant_name<'a>(columns: impl IntoIterator<Item = &'a ColumnMetadata>) -> Ident {
    let name: String = columns
        .into_iter()
        .map(|c| c.ident.to_string().trim_start_matches('_').to_case(Case::Pascal))
        .collect();
    Ident::new(&name, Span::call_site())
}

/// Primary key first, then the single column unique fields, then the composite unique sets.
fn variants<'t>(table: &'t TableMetadata) -> Vec<(Ident, Vec<&'t ColumnMetadata>)> {
    let mut result: Vec<(Ident, Vec<&'t ColumnMetadata>)> = Vec::new();
    let mut push = |columns: Vec<&'t ColumnMetadata>| {
        let name = variant_name(columns.iter().copied());
        if !result.iter().any(|(n, _)| *n == name) {
            result.push((name, columns));
        }
    };
    if !table.primary_key.is_empty() {
        push(table.primary_key_columns().collect());
    }
    for column in table.columns.iter().filter(|c| c.unique) {
        push(vec![column]);
    }
    for set in &table.unique {
        push(set.iter().map(|i| &table.columns[*i]).collect());
    }
    result
}

pub(crate) fn unique_enum(table: &TableMetadata) -> TokenStream {
    let struct_name = &table.item.ident;
    let vis = &table.item.vis;
    let enum_name = unique_enum_name(table);
    let variants = variants(table);
    let declarations = variants.iter().map(|(name, columns)| {
        let types = columns.iter().map(|c| &c.inner);
        quote!(#name(#(#types),*))
    });
    let arms = variants.iter().map(|(name, columns)| {
        let bindings: Vec<_> = (0..columns.len()).map(|i| format_ident!("v{}", i)).collect();
        let conditions = columns.iter().zip(bindings.iter()).map(|(c, v)| {
            let field = &c.ident;
            quote! {
                ::evalkit::Filterable::equals(&#struct_name::#field, ::std::clone::Clone::clone(#v))
            }
        });
        quote! {
            Self::#name(#(#bindings),*) => ::evalkit::Condition::all_of([#(#conditions),*])
        }
    });
    let body = if variants.is_empty() {
        quote!(match *self {})
    } else {
        quote! {
            match self {
                #(#arms,)*
            }
        }
    };
    let doc = format!("Selects one `{}` through its primary key or a unique key.", struct_name);
    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        #vis enum #enum_name {
            #(#declarations,)*
        }

        impl ::evalkit::UniqueWhere for #enum_name {
            fn condition(&self) -> ::evalkit::Condition {
                #body
            }
        }
    }
}

/// Body of `Entity::unique_key`, the primary key variant built from the record fields.
pub(crate) fn unique_key_body(table: &TableMetadata) -> TokenStream {
    let struct_name = &table.item.ident;
    let enum_name = unique_enum_name(table);
    if table.primary_key.is_empty() {
        let message = format!("Model `{}` has no primary key", table.name);
        return quote! {
            Err(::evalkit::ClientError::Validation(#message.into()).into())
        };
    }
    let variant = variant_name(table.primary_key_columns());
    let values = table.primary_key_columns().map(|c| {
        let field = &c.ident;
        if c.passive {
            let message = format!(
                "`{}.{}` is not set, the record has not been stored yet",
                struct_name, c.ident
            );
            quote! {
                match self.#field.get() {
                    Some(v) => ::std::clone::Clone::clone(v),
                    None => {
                        return Err(::evalkit::ClientError::Validation(#message.into()).into());
                    }
                }
            }
        } else {
            quote!(::std::clone::Clone::clone(&self.#field))
        }
    });
    quote! {
        Ok(#enum_name::#variant(#(#values),*))
    }
}

#[cfg(test)]
mod tests {
    use super::variants;
    use crate::decode_table::decode_table;
    use syn::{ItemStruct, parse_quote};

    #[test]
    fn primary_then_unique_then_composite() {
        let item: ItemStruct = parse_quote! {
            #[evalkit(unique = (Self::code, Self::term))]
            struct Offering {
                #[evalkit(primary_key)]
                _id: i64,
                #[evalkit(unique)]
                code: String,
                term: String,
            }
        };
        let table = decode_table(item).expect("Valid table");
        let names: Vec<(String, Vec<String>)> = variants(&table)
            .into_iter()
            .map(|(name, columns)| {
                (
                    name.to_string(),
                    columns.iter().map(|c| c.name.clone()).collect(),
                )
            })
            .collect();
        assert_eq!(
            names,
            [
                ("Id".to_string(), vec!["id".to_string()]),
                ("Code".to_string(), vec!["code".to_string()]),
                ("CodeTerm".to_string(), vec!["code".to_string(), "term".to_string()]),
            ]
        );
    }
}
