use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

const USAGE: &str = "rxcore_macro::test only accepts: #[rxcore_macro::test], \
                     #[rxcore_macro::test(local)], #[rxcore_macro::test(shared)], or string \
                     equivalents";

/// Marks a test function.
///
/// Sync functions become plain `#[test]`s. Async functions run on a tokio
/// runtime: `local` (the default) uses the current-thread flavor, `shared`
/// the multi-thread flavor, which is what the cross-thread scheduler tests
/// need.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let flavor = if raw_args.is_empty() {
    quote!(flavor = "current_thread")
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxcore_macro::test flavor args are only supported for async tests. Use \
           #[rxcore_macro::test] for sync tests, or make the function async.",
        )
        .to_compile_error(),
      );
    }

    let name = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      ident.to_string()
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      lit.value()
    } else {
      return TokenStream::from(syn::Error::new(raw_args.span(), USAGE).to_compile_error());
    };

    match name.as_str() {
      "local" => quote!(flavor = "current_thread"),
      "shared" => quote!(flavor = "multi_thread", worker_threads = 2),
      _ => return TokenStream::from(syn::Error::new(raw_args.span(), USAGE).to_compile_error()),
    }
  };

  let attr = if is_async { quote!(#[tokio::test(#flavor)]) } else { quote!(#[test]) };

  let expanded = quote! {
      #attr
      #input
  };

  TokenStream::from(expanded)
}
