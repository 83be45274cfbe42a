//! Contract trait macro for the Lattice framework
//!
//! Provides the `#[contract]` attribute macro that:
//! 1. Adds `Send + Sync + 'static` bounds to trait definitions
//! 2. Registers the trait in the module's self-registration table
//! 3. Generates the hidden binding helper components use, which also binds
//!    every contract the trait extends

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, Ident, ItemTrait, LitStr, Token};

/// Parsed arguments from the contract attribute
struct ContractArgs {
    module: Option<LitStr>,
}

impl Parse for ContractArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut module = None;

        while !input.is_empty() {
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

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ContractArgs { module })
    }
}

/// Supertraits from the standard library are never contracts
const STD_TRAITS: &[&str] = &[
    "Send", "Sync", "Sized", "Unpin", "Any", "Debug", "Display", "Clone", "Copy", "Default",
    "PartialEq", "Eq", "PartialOrd", "Ord", "Hash", "Error",
];

/// Supertraits that are themselves contracts
///
/// Generic traits cannot be contracts, so any bound with type arguments is
/// skipped along with `std`/`core`/`alloc` paths and the common std traits.
fn super_contracts(item_trait: &ItemTrait) -> Vec<syn::Path> {
    item_trait
        .supertraits
        .iter()
        .filter_map(|bound| match bound {
            syn::TypeParamBound::Trait(trait_bound)
                if matches!(trait_bound.modifier, syn::TraitBoundModifier::None) =>
            {
                Some(&trait_bound.path)
            }
            _ => None,
        })
        .filter(|path| {
            let first = path.segments.first().map(|s| s.ident.to_string());
            let last = path.segments.last();
            !matches!(first.as_deref(), Some("std" | "core" | "alloc"))
                && last.map_or(false, |s| {
                    s.arguments.is_empty() && !STD_TRAITS.contains(&s.ident.to_string().as_str())
                })
        })
        .cloned()
        .collect()
}

fn has_trait_bound(item_trait: &ItemTrait, ident: &str) -> bool {
    item_trait.supertraits.iter().any(|bound| {
        if let syn::TypeParamBound::Trait(trait_bound) = bound {
            trait_bound
                .path
                .segments
                .last()
                .map(|s| s.ident == ident)
                .unwrap_or(false)
        } else {
            false
        }
    })
}

/// Implements the `#[contract]` attribute macro
///
/// ```rust,ignore
/// #[contract]
/// pub trait ProductCatalog {
///     fn list(&self) -> Vec<Product>;
/// }
///
/// // Expands to
/// pub trait ProductCatalog: Send + Sync + 'static {
///     fn list(&self) -> Vec<Product>;
/// }
/// // plus a ContractEntry for the current module, and
/// // `<dyn ProductCatalog>::__lattice_bindings::<T>()` for components
/// ```
///
/// A supertrait that is itself a contract is bound too: a component
/// declared `#[component(Sub)]` for `trait Sub: Base` satisfies both.
pub fn contract_impl(attr: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ContractArgs);
    let mut item_trait = parse_macro_input!(input as ItemTrait);

    if !item_trait.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &item_trait.generics,
            "contract traits cannot be generic; bind a concrete trait instead",
        )
        .to_compile_error()
        .into();
    }

    let supers = super_contracts(&item_trait);

    let has_static = item_trait
        .supertraits
        .iter()
        .any(|bound| matches!(bound, syn::TypeParamBound::Lifetime(lt) if lt.ident == "static"));

    if !has_trait_bound(&item_trait, "Send") {
        item_trait.supertraits.push(syn::parse_quote!(Send));
    }
    if !has_trait_bound(&item_trait, "Sync") {
        item_trait.supertraits.push(syn::parse_quote!(Sync));
    }
    if !has_static {
        item_trait.supertraits.push(syn::parse_quote!('static));
    }

    let trait_name = &item_trait.ident;
    let trait_name_str = trait_name.to_string();
    let module = match &args.module {
        Some(lit) => quote!(#lit),
        None => quote!(::std::module_path!()),
    };

    let expanded = quote! {
        #item_trait

        ::lattice::inventory::submit! {
            ::lattice::container::provider::ContractEntry {
                name: #trait_name_str,
                module: #module,
                type_name: || ::std::any::type_name::<dyn #trait_name>(),
            }
        }

        #[doc(hidden)]
        impl dyn #trait_name {
            /// Append the binding of this contract and of every contract it
            /// extends, skipping contracts already in `out`
            pub fn __lattice_bindings<T>(
                out: &mut ::std::vec::Vec<::lattice::container::provider::ContractBinding>,
            ) where
                T: #trait_name + ::lattice::container::provider::Component,
            {
                fn bind<T>(container: &mut ::lattice::container::Container)
                where
                    T: #trait_name + ::lattice::container::provider::Component,
                {
                    container.bind_scoped::<dyn #trait_name, _>(|scope| {
                        let instance =
                            <T as ::lattice::container::provider::Component>::construct(scope)?;
                        ::std::result::Result::Ok(
                            ::std::sync::Arc::new(instance) as ::std::sync::Arc<dyn #trait_name>
                        )
                    });
                }

                let type_name = ::std::any::type_name::<dyn #trait_name>();
                if out.iter().any(|binding| (binding.type_name)() == type_name) {
                    return;
                }
                out.push(::lattice::container::provider::ContractBinding {
                    name: #trait_name_str,
                    type_name: || ::std::any::type_name::<dyn #trait_name>(),
                    bind: bind::<T>,
                });
                #( <dyn #supers>::__lattice_bindings::<T>(out); )*
            }
        }
    };

    TokenStream::from(expanded)
}
