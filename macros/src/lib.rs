//! Derive macros for the Waypoint reducer architecture
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates helpers for action enums (commands/events)
//!
//! # Example
//!
//! ```ignore
//! use waypoint_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum RouterAction {
//!     #[command]
//!     NavigateTo { target: String },
//!
//!     #[event]
//!     NavigationStarted { path: String },
//! }
//!
//! // Generated methods:
//! assert!(RouterAction::NavigateTo { target: "/".into() }.is_command());
//! assert!(RouterAction::NavigationStarted { path: "/".into() }.is_event());
//! assert_eq!(RouterAction::NavigateTo { target: "/".into() }.action_name(), "NavigateTo");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Variant};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is a command
/// - `is_event()` - Returns true if this variant is an event
/// - `action_name()` - Returns the variant name, for logs and metrics labels
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command (an intent handled by producing effects)
/// - `#[event]` - Mark a variant as an event (a fact that drives state transitions)
///
/// Generics on the enum are supported; the impl carries the enum's bounds.
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]` attributes
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut is_command_arms = Vec::new();
    let mut is_event_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = variant_pattern(variant);
        let variant_name = variant.ident.to_string();

        if is_command {
            is_command_arms.push(quote! { #pattern => true, });
        }
        if is_event {
            is_event_arms.push(quote! { #pattern => true, });
        }
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Returns true if this action is a command
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#is_command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#is_event_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name of this action
            #[must_use]
            pub const fn action_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Builds a wildcard pattern matching any value of the variant
fn variant_pattern(variant: &Variant) -> proc_macro2::TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
