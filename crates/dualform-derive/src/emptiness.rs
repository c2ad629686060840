use darling::{
    FromDeriveInput, FromField,
    ast::Data,
    util::{Flag, Ignored},
};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Generics, Index, Path, WherePredicate, parse_quote};

#[derive(FromDeriveInput)]
#[darling(attributes(emptiness))]
struct EmptinessInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, EmptinessField>,
    #[darling(default)]
    crate_path: Option<Path>,
    #[darling(default)]
    bound: Option<Vec<WherePredicate>>,
}

#[derive(FromField)]
#[darling(attributes(emptiness))]
struct EmptinessField {
    ident: Option<Ident>,
    #[darling(default)]
    skip: Flag,
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let EmptinessInput {
        ident,
        mut generics,
        data,
        crate_path,
        bound,
    } = match EmptinessInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };
    let fields = match data {
        Data::Enum(_) => {
            return quote! {
                compile_error!("`#[derive(Emptiness)]` does not support enums, implement `Emptiness` manually");
            };
        }
        Data::Struct(fields) => fields.fields,
    };
    let crate_path = crate_path.unwrap_or_else(|| parse_quote!(::dualform));

    // A struct is zero if all of its (non-skipped) fields are zero
    let field_checks = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| !field.skip.is_present())
        .map(|(index, EmptinessField { ident, .. })| {
            let member = match ident {
                Some(ident) => quote! { #ident },
                None => {
                    let index = Index::from(index);
                    quote! { #index }
                }
            };
            quote! {
                && #crate_path::capability::Emptiness::is_zero(&self.#member)
            }
        })
        .collect::<TokenStream>();

    if let Some(bound) = bound {
        let where_clause = generics.make_where_clause();
        where_clause.predicates.extend(bound);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics #crate_path::capability::Emptiness for #ident #ty_generics #where_clause {
            fn is_zero(&self) -> bool {
                true #field_checks
            }
        }
    }
}
