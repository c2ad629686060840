use darling::{
    FromDeriveInput, FromField, FromVariant,
    ast::{Data, Fields, Style},
    util::Flag,
};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::{DeriveInput, Generics, Index, LitStr, Path, WherePredicate, parse_quote};

#[derive(FromDeriveInput)]
#[darling(attributes(validate))]
struct ValidateInput {
    ident: Ident,
    generics: Generics,
    data: Data<ValidateVariant, ValidateField>,
    #[darling(default)]
    crate_path: Option<Path>,
    #[darling(default)]
    bound: Option<Vec<WherePredicate>>,
    /// Struct-level check, run after all fields passed
    #[darling(default)]
    with: Option<Path>,
}

#[derive(FromVariant)]
struct ValidateVariant {
    ident: Ident,
    fields: Fields<ValidateField>,
}

#[derive(FromField)]
#[darling(attributes(validate))]
struct ValidateField {
    ident: Option<Ident>,
    #[darling(default)]
    skip: Flag,
}

impl ValidateField {
    /// The name reported in validation error paths: the field name, or the index for tuple fields
    fn path_segment(&self, index: usize) -> TokenStream {
        match &self.ident {
            Some(ident) => {
                let name = LitStr::new(&ident.to_string(), Span::call_site());
                quote! { #name }
            }
            None => quote! { #index },
        }
    }
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let ValidateInput {
        ident,
        mut generics,
        data,
        crate_path,
        bound,
        with,
    } = match ValidateInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };
    let crate_path = crate_path.unwrap_or_else(|| parse_quote!(::dualform));
    let validate_fn = quote! { #crate_path::capability::Validate::validate };

    let body = match data {
        Data::Struct(fields) => fields
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.skip.is_present())
            .map(|(index, field)| {
                let member = match &field.ident {
                    Some(ident) => quote! { #ident },
                    None => {
                        let index = Index::from(index);
                        quote! { #index }
                    }
                };
                let segment = field.path_segment(index);
                quote! {
                    #validate_fn(&self.#member, validator.field(&#segment))?;
                }
            })
            .collect::<TokenStream>(),
        Data::Enum(variants) => {
            let arms = variants
                .iter()
                .map(|variant| validate_variant(variant, &validate_fn))
                .collect::<TokenStream>();
            quote! {
                match self {
                    #arms
                }
            }
        }
    };

    let with_check = with.map(|with| {
        quote! {
            #with(self, validator)?;
        }
    });

    if let Some(bound) = bound {
        let where_clause = generics.make_where_clause();
        where_clause.predicates.extend(bound);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics #crate_path::capability::Validate for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn validate(
                &self,
                validator: #crate_path::validation::Validator,
            ) -> ::core::result::Result<(), #crate_path::validation::ValidationError> {
                #body
                #with_check
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// Generates the match arm validating all (non-skipped) fields of one enum variant
fn validate_variant(
    ValidateVariant {
        ident: variant_ident,
        fields,
    }: &ValidateVariant,
    validate_fn: &TokenStream,
) -> TokenStream {
    let bindings = fields
        .iter()
        .enumerate()
        .map(|(index, field)| match &field.ident {
            Some(ident) => ident.clone(),
            None => format_ident!("__field{index}"),
        })
        .collect::<Vec<_>>();

    let checks = fields
        .iter()
        .zip(&bindings)
        .enumerate()
        .filter(|(_, (field, _))| !field.skip.is_present())
        .map(|(index, (field, binding))| {
            let segment = field.path_segment(index);
            quote! {
                #validate_fn(#binding, validator.field(&#segment))?;
            }
        })
        .collect::<TokenStream>();

    // Skipped fields are still bound, so silence unused variable warnings for them
    let pattern = match fields.style {
        Style::Struct => quote! { Self::#variant_ident { #(#bindings),* } },
        Style::Tuple => quote! { Self::#variant_ident ( #(#bindings),* ) },
        Style::Unit => quote! { Self::#variant_ident },
    };
    quote! {
        #[allow(unused_variables)]
        #pattern => {
            #checks
        }
    }
}
