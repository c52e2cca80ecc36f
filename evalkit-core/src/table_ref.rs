use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};

/// Table name, optional schema and alias.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef {
    pub name: &'static str,
    pub schema: &'static str,
    pub alias: &'static str,
}

impl TableRef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            schema: "",
            alias: "",
        }
    }

    pub fn full_name(&self) -> String {
        let mut result = String::new();
        if !self.alias.is_empty() {
            result.push_str(self.alias);
        } else {
            if !self.schema.is_empty() {
                result.push_str(self.schema);
                result.push('.');
            }
            result.push_str(self.name);
        }
        result
    }
}

impl ToTokens for TableRef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = self.name;
        let schema = self.schema;
        let alias = self.alias;
        tokens.append_all(quote! {
            ::evalkit::TableRef {
                name: #name,
                schema: #schema,
                alias: #alias,
            }
        });
    }
}
