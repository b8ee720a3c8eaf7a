//! Types kept as text: function pointers, `Fn(..)` bounds, qualified self
//! paths and anything else without a structured [`TypeRef`](crate::TypeRef)
//! form.
//!
//! The text is stored in canonical spacing and re-parsed on render so that
//! target qualifiers inside it can be dropped like everywhere else.

use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};
use syn::{Item, Type, TypeParamBound, TypePath, TypeTraitObject};

/// Canonical text of a type.
pub(crate) fn print_type(ty: &Type) -> String {
    let file = syn::File {
        shebang: None,
        attrs: Vec::new(),
        items: vec![Item::Type(syn::parse_quote! { type T = #ty; })],
    };
    let printed = prettyplease::unparse(&file);
    let body = printed
        .trim_end()
        .strip_prefix("type T = ")
        .and_then(|rest| rest.strip_suffix(';'));
    match body {
        // Long types wrap across lines.
        Some(body) => body.lines().map(str::trim).collect::<Vec<_>>().join(" "),
        None => ty.to_token_stream().to_string(),
    }
}

/// Canonical text of a bound.
pub(crate) fn print_bound(bound: &TypeParamBound) -> String {
    match bound {
        TypeParamBound::Lifetime(lifetime) => lifetime.to_string(),
        TypeParamBound::Trait(_) => {
            let object = Type::TraitObject(TypeTraitObject {
                dyn_token: Some(Default::default()),
                bounds: Punctuated::from_iter([bound.clone()]),
            });
            let printed = print_type(&object);
            match printed.strip_prefix("dyn ") {
                Some(rest) => rest.to_string(),
                None => printed,
            }
        }
        other => other.to_token_stream().to_string(),
    }
}

/// Render verbatim `text` from inside the module `target`.
pub(crate) fn render(text: &str, target: &str) -> String {
    let mut strip = StripQualifier { target };
    if let Ok(mut ty) = syn::parse_str::<Type>(text) {
        strip.visit_type_mut(&mut ty);
        return print_type(&ty);
    }
    if let Ok(mut bound) = syn::parse_str::<TypeParamBound>(text) {
        strip.visit_type_param_bound_mut(&mut bound);
        return print_bound(&bound);
    }
    text.to_string()
}

/// Drops the leading segments of every path qualified by exactly `target`.
struct StripQualifier<'a> {
    target: &'a str,
}

impl StripQualifier<'_> {
    fn qualifies(&self, path: &syn::Path) -> bool {
        let segments: Vec<_> = path.segments.iter().collect();
        let Some((_, prefix)) = segments.split_last() else {
            return false;
        };
        if prefix.is_empty() || prefix.iter().any(|s| !s.arguments.is_empty()) {
            return false;
        }
        let joined = prefix
            .iter()
            .map(|s| s.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        let qualifier = match path.leading_colon {
            Some(_) => format!("::{joined}"),
            None => joined,
        };
        qualifier == self.target
    }
}

impl VisitMut for StripQualifier<'_> {
    fn visit_type_path_mut(&mut self, ty: &mut TypePath) {
        // The segments of `<T as Trait>::Name` are counted by the qself position.
        if let Some(qself) = &mut ty.qself {
            self.visit_type_mut(&mut qself.ty);
            for segment in ty.path.segments.iter_mut() {
                self.visit_path_arguments_mut(&mut segment.arguments);
            }
            return;
        }
        visit_mut::visit_type_path_mut(self, ty);
    }

    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        visit_mut::visit_path_mut(self, path);
        if !self.qualifies(path) {
            return;
        }
        if let Some(last) = path.segments.pop() {
            path.segments = Punctuated::from_iter([last.into_value()]);
            path.leading_colon = None;
        }
    }
}
