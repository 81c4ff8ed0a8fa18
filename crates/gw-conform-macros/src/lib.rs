//! # gw-conform-macros
//!
//! Procedural macros for running gw-conform from `cargo test`.
//!
//! [`check!`] expands to a `conformance` module holding one `#[test]` per
//! built-in check, so each convention passes or fails on its own line of the
//! test report.

#![forbid(unsafe_code)]

use gw_conform_checks::Suite;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, LitStr, MetaNameValue, Token};

/// Parsed `key = "value"` arguments of `check!`.
#[derive(Default)]
struct CheckArgs {
    suite: Option<LitStr>,
    config: Option<LitStr>,
    fail_on: Option<LitStr>,
}

impl Parse for CheckArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;
        let mut args = Self::default();

        for pair in pairs {
            let key = pair
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            let value = match &pair.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => s.clone(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "gw-conform: expected a string literal",
                    ))
                }
            };

            let slot = match key.as_str() {
                "suite" => &mut args.suite,
                "config" => &mut args.config,
                "fail_on" => &mut args.fail_on,
                _ => {
                    return Err(syn::Error::new_spanned(
                        &pair.path,
                        "gw-conform: unknown argument, expected `suite`, `config` or `fail_on`",
                    ))
                }
            };
            if slot.replace(value).is_some() {
                return Err(syn::Error::new_spanned(
                    &pair.path,
                    format!("gw-conform: duplicate argument `{key}`"),
                ));
            }
        }

        Ok(args)
    }
}

/// Generates one test function per convention check.
///
/// ```rust,ignore
/// // tests/conformance.rs
/// gw_conform::check!();
/// gw_conform::check!(suite = "generic", config = "gw-conform.toml", fail_on = "warning");
/// ```
///
/// Arguments (all optional):
///
/// - `suite`: `generic`, `package`, `style` or `all`. Only the checks of the
///   suite get a test function. Without it, every check gets one and the suite
///   from the configuration file decides which of them run.
/// - `config`: path to the configuration file, relative to the directory of
///   the crate holding the test. Without it, `gw-conform.toml` is searched
///   upward from that directory.
/// - `fail_on`: lowest severity that fails a test (`error`, `warning`, `info`).
#[proc_macro]
pub fn check(input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(input as CheckArgs);

    let suite = match &args.suite {
        Some(lit) => match Suite::from_name(&lit.value()) {
            Some(suite) => suite,
            None => {
                return syn::Error::new(
                    lit.span(),
                    "gw-conform: unknown suite, expected `generic`, `package`, `style` or `all`",
                )
                .to_compile_error()
                .into();
            }
        },
        None => Suite::All,
    };

    let opt = |lit: &Option<LitStr>| match lit {
        Some(lit) => quote!(::core::option::Option::Some(#lit)),
        None => quote!(::core::option::Option::None),
    };
    let suite_arg = opt(&args.suite);
    let config_arg = opt(&args.config);
    let fail_on_arg = opt(&args.fail_on);

    let tests = suite.check_names().into_iter().map(|name| {
        let ident = format_ident!("{}", name.replace('-', "_"), span = Span::call_site());
        quote! {
            #[test]
            fn #ident() {
                ::gw_conform::__internal::run_check(#name, #suite_arg, #config_arg, #fail_on_arg);
            }
        }
    });

    quote! {
        /// Convention checks generated by `gw_conform::check!`.
        mod conformance {
            #(#tests)*
        }
    }
    .into()
}
