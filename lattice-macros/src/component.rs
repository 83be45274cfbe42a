//! Component attribute macro for the Lattice framework
//!
//! Provides the `#[component(ContractA, ContractB)]` attribute macro that
//! registers a struct as the implementation of the listed contracts.
//!
//! Supports constructor injection via the `#[inject]` field attribute.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, DeriveInput, Fields, Ident, LitStr, Path, Token};

/// Parsed arguments: contract paths, optionally `module = "..."`
struct ComponentArgs {
    contracts: Vec<Path>,
    module: Option<LitStr>,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut contracts = Vec::new();
        let mut module = None;

        while !input.is_empty() {
            // Named parameter (module = "...") or a contract path
            let fork = input.fork();
            let is_named = fork.parse::<Ident>().is_ok() && fork.peek(Token![=]);

            if is_named {
                let name: Ident = input.parse()?;
                input.parse::<Token![=]>()?;
                match name.to_string().as_str() {
                    "module" => module = Some(input.parse()?),
                    _ => {
                        return Err(syn::Error::new(
                            name.span(),
                            format!("unknown parameter '{}', expected 'module'", name),
                        ))
                    }
                }
            } else {
                // Accept both `Contract` and `dyn Contract`
                if input.peek(Token![dyn]) {
                    input.parse::<Token![dyn]>()?;
                }
                contracts.push(input.parse()?);
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ComponentArgs { contracts, module })
    }
}

/// Check if a field has the #[inject] attribute
fn has_inject_attr(field: &syn::Field) -> bool {
    field
        .attrs
        .iter()
        .any(|attr| attr.path().is_ident("inject"))
}

/// Implements the `#[component]` attribute macro
///
/// # Example - No dependencies
///
/// ```rust,ignore
/// #[component(PriceCalculator)]
/// #[derive(Default)]
/// pub struct StandardPricing;
/// ```
///
/// # Example - With dependencies
///
/// ```rust,ignore
/// #[component(ProductCatalog)]
/// pub struct InMemoryCatalog {
///     #[inject]
///     pricing: Arc<dyn PriceCalculator>,
///     products: Vec<Product>, // Default::default()
/// }
/// ```
pub fn component_impl(attr: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ComponentArgs);
    let mut input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "component does not support generic types",
        )
        .to_compile_error()
        .into();
    }

    let construct_body = match &mut input.data {
        syn::Data::Struct(data_struct) => match &mut data_struct.fields {
            Fields::Named(fields_named) => {
                let mut initializations = Vec::new();
                for field in fields_named.named.iter_mut() {
                    let field_name = field.ident.clone();
                    let field_ty = &field.ty;
                    if has_inject_attr(field) {
                        // This field needs to be resolved from the scope
                        initializations.push(quote! {
                            #field_name: <#field_ty as ::lattice::container::FromScope>::from_scope(scope)?
                        });
                    } else {
                        initializations.push(quote! {
                            #field_name: ::std::default::Default::default()
                        });
                    }
                    // Strip #[inject] from the emitted struct
                    field.attrs.retain(|attr| !attr.path().is_ident("inject"));
                }
                quote! { Self { #(#initializations),* } }
            }
            Fields::Unit => quote! { Self },
            Fields::Unnamed(_) => {
                return syn::Error::new_spanned(
                    &input.ident,
                    "component does not support tuple structs. Use named fields instead.",
                )
                .to_compile_error()
                .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input.ident, "component can only be used on structs")
                .to_compile_error()
                .into()
        }
    };

    let name = &input.ident;
    let name_str = name.to_string();
    let module = match &args.module {
        Some(lit) => quote!(#lit),
        None => quote!(::std::module_path!()),
    };

    let contracts = &args.contracts;

    let expanded = quote! {
        #input

        impl ::lattice::container::provider::Component for #name {
            fn construct(
                scope: &::lattice::container::Scope,
            ) -> ::std::result::Result<Self, ::lattice::FrameworkError> {
                let _ = scope;
                ::std::result::Result::Ok(#construct_body)
            }
        }

        const _: () = {
            #[allow(unused_mut)]
            fn __lattice_contracts() -> ::std::vec::Vec<::lattice::container::provider::ContractBinding> {
                let mut out = ::std::vec::Vec::new();
                #( <dyn #contracts>::__lattice_bindings::<#name>(&mut out); )*
                out
            }

            ::lattice::inventory::submit! {
                ::lattice::container::provider::ComponentEntry {
                    name: #name_str,
                    module: #module,
                    contracts: __lattice_contracts,
                }
            }
        };
    };

    TokenStream::from(expanded)
}
