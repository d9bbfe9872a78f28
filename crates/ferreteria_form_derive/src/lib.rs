use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Implements `ferreteria::form::FormModel` for a struct with named fields.
/// Every field type must implement `ferreteria::form::FormField`; the form
/// key of a field is its Rust name.
#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let ferreteria = ferreteria_path();
    let form = quote!(#ferreteria::form);
    let mut keys = Vec::new();
    let mut inserts = Vec::new();
    let mut reads = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.to_string();
        let field_name = field_name.strip_prefix("r#").unwrap_or(&field_name);

        keys.push(quote! {
            #form::FieldKey::new(#field_name)
        });

        inserts.push(quote! {
            values.insert(
                #form::FieldKey::new(#field_name),
                <#field_ty as #form::FormField>::to_field_value(&self.#field_ident),
            );
        });

        reads.push(quote! {
            #field_ident: <#field_ty as #form::FormField>::from_field_value(
                values.value(#field_name),
            )
            .map_err(|error| (#form::FieldKey::new(#field_name), error))?,
        });
    }

    quote! {
        impl #form::FormModel for #model_ident {
            fn field_keys() -> ::std::vec::Vec<#form::FieldKey> {
                ::std::vec![#(#keys),*]
            }

            fn to_values(&self) -> #form::FormValues {
                let mut values = #form::FormValues::new();
                #(#inserts)*
                values
            }

            fn from_values(
                values: &#form::FormValues,
            ) -> ::std::result::Result<Self, (#form::FieldKey, #form::FieldValueError)> {
                ::std::result::Result::Ok(Self {
                    #(#reads)*
                })
            }
        }
    }
    .into()
}

fn ferreteria_path() -> TokenStream2 {
    match crate_name("ferreteria") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::ferreteria),
    }
}
