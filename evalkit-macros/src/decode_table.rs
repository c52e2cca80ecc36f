use crate::decode_column::{ColumnMetadata, decode_column};
use evalkit_core::{PrimaryKeyType, matches_path};
use quote::ToTokens;
use syn::{Error, Expr, ExprLit, ExprPath, ItemStruct, Lit, LitStr, Result, spanned::Spanned};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) schema: String,
    pub(crate) columns: Vec<ColumnMetadata>,
    /// Indexes into `columns`.
    pub(crate) primary_key: Vec<usize>,
    /// Composite unique constraints, indexes into `columns`.
    pub(crate) unique: Vec<Vec<usize>>,
}

impl TableMetadata {
    pub(crate) fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.primary_key.iter().map(|i| &self.columns[*i])
    }
}

/// Resolves `Self::field`, `Model::field`, `"columnName"` or a tuple of them.
fn decode_set_columns(item: &ItemStruct, columns: &[ColumnMetadata], expr: &Expr) -> Result<Vec<usize>> {
    Ok(match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(v), ..
        }) => {
            let name = v.value();
            let Some(i) = columns.iter().position(|c| c.name == name) else {
                return Err(Error::new(
                    v.span(),
                    format!("Column `{}` does not exist in the table", name),
                ));
            };
            vec![i]
        }
        Expr::Path(ExprPath { path, .. }) => {
            let Some(i) = columns.iter().position(|c| {
                let field = c.ident.to_string();
                path.segments.len() == 2
                    && (matches_path(path, &["Self", &field])
                        || matches_path(path, &[&item.ident.to_string(), &field]))
            }) else {
                return Err(Error::new(
                    path.span(),
                    format!(
                        "Field `{}` does not exist in the entity",
                        path.to_token_stream()
                    ),
                ));
            };
            vec![i]
        }
        Expr::Tuple(tuple) => {
            let mut result = Vec::with_capacity(tuple.elems.len());
            for elem in &tuple.elems {
                result.extend(decode_set_columns(item, columns, elem)?);
            }
            result
        }
        Expr::Paren(paren) => decode_set_columns(item, columns, &paren.expr)?,
        _ => {
            return Err(Error::new(
                expr.span(),
                "Expected `Self::field` or a tuple `(Self::a, Self::b)`",
            ));
        }
    })
}

pub(crate) fn decode_table(item: ItemStruct) -> Result<TableMetadata> {
    if !item.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &item.generics,
            "Entity cannot be derived for generic structs",
        ));
    }
    let columns = item
        .fields
        .iter()
        .map(decode_column)
        .collect::<Result<Vec<_>>>()?;
    let mut name = item.ident.to_string();
    let mut schema = String::new();
    let mut primary_key: Option<Vec<usize>> = None;
    let mut unique = Vec::new();
    for attr in item.attrs.iter().filter(|a| a.path().is_ident("evalkit")) {
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                name = arg.value()?.parse::<LitStr>()?.value();
            } else if arg.path.is_ident("schema") {
                schema = arg.value()?.parse::<LitStr>()?.value();
            } else if arg.path.is_ident("primary_key") {
                let expr: Expr = arg.value()?.parse()?;
                primary_key = Some(decode_set_columns(&item, &columns, &expr)?);
            } else if arg.path.is_ident("unique") {
                let expr: Expr = arg.value()?.parse()?;
                unique.push(decode_set_columns(&item, &columns, &expr)?);
            } else {
                return Err(arg.error("Unknown `evalkit` table attribute"));
            }
            Ok(())
        })?;
    }
    let mut table = TableMetadata {
        item,
        name,
        schema,
        columns,
        primary_key: Vec::new(),
        unique: Vec::new(),
    };
    if let Some(primary_key) = primary_key {
        if let Some(column) = table
            .columns
            .iter()
            .find(|c| c.primary_key != PrimaryKeyType::None)
        {
            return Err(Error::new(
                column.ident.span(),
                format!(
                    "Column `{}` cannot be declared as a primary key while the table also specifies one",
                    column.name
                ),
            ));
        }
        let part = if primary_key.len() == 1 {
            PrimaryKeyType::PrimaryKey
        } else {
            PrimaryKeyType::PartOfPrimaryKey
        };
        for i in &primary_key {
            table.columns[*i].primary_key = part;
            table.columns[*i].nullable = false;
        }
        table.primary_key = primary_key;
    } else {
        table.primary_key = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key != PrimaryKeyType::None)
            .map(|(i, _)| i)
            .collect();
        if table.primary_key.len() > 1 {
            return Err(Error::new_spanned(
                &table.item.ident,
                "Multiple columns are marked `primary_key`, declare a composite key with `#[evalkit(primary_key = (Self::a, Self::b))]`",
            ));
        }
    }
    for set in unique {
        if let [i] = set.as_slice() {
            table.columns[*i].unique = true;
        } else {
            table.unique.push(set);
        }
    }
    Ok(table)
}
