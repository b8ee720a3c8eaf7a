//! Parsing type references from Rust type syntax.

use std::str::FromStr;

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, TraitBoundModifier, Type, TypeParamBound};
use thiserror::Error;

use crate::types::{GenericArg, TraitKind, TypeRef};
use crate::verbatim::{print_bound, print_type};

/// A type string that is not valid Rust type syntax.
#[derive(Debug, Clone, Error)]
#[error("invalid type `{input}`: {message}")]
pub struct ParseTypeError {
    pub input: String,
    pub message: String,
}

impl FromStr for TypeRef {
    type Err = ParseTypeError;

    /// Parse model notation: Rust type syntax, optionally prefixed with `...`
    /// for a variadic parameter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(elem) = trimmed.strip_prefix("...") {
            let elem: TypeRef = elem.parse()?;
            if elem.is_variadic() {
                return Err(ParseTypeError {
                    input: s.to_string(),
                    message: "variadic marker may only appear once".to_string(),
                });
            }
            return Ok(TypeRef::variadic(elem));
        }

        let ty: Type = syn::parse_str(trimmed).map_err(|e| ParseTypeError {
            input: s.to_string(),
            message: e.to_string(),
        })?;
        Ok(lower(&ty))
    }
}

impl TryFrom<String> for TypeRef {
    type Error = ParseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<&Type> for TypeRef {
    fn from(ty: &Type) -> Self {
        lower(ty)
    }
}

fn verbatim(ty: &Type) -> TypeRef {
    TypeRef::Verbatim(print_type(ty))
}

fn lower(ty: &Type) -> TypeRef {
    match ty {
        Type::Path(tp) if tp.qself.is_none() => lower_path(&tp.path).unwrap_or_else(|| verbatim(ty)),
        Type::Reference(r) => TypeRef::Reference {
            lifetime: r.lifetime.as_ref().map(|l| l.to_string()),
            mutable: r.mutability.is_some(),
            inner: Box::new(lower(&r.elem)),
        },
        Type::Slice(s) => TypeRef::slice(lower(&s.elem)),
        Type::Array(a) => TypeRef::Array {
            elem: Box::new(lower(&a.elem)),
            len: a.len.to_token_stream().to_string(),
        },
        Type::Tuple(t) => TypeRef::Tuple(t.elems.iter().map(lower).collect()),
        Type::Paren(p) => lower(&p.elem),
        Type::Group(g) => lower(&g.elem),
        Type::TraitObject(o) => TypeRef::TraitObject {
            kind: TraitKind::Dyn,
            bounds: o.bounds.iter().map(lower_bound).collect(),
        },
        Type::ImplTrait(i) => TypeRef::TraitObject {
            kind: TraitKind::Impl,
            bounds: i.bounds.iter().map(lower_bound).collect(),
        },
        other => verbatim(other),
    }
}

/// Lower a path whose only generic arguments sit on the last segment.
fn lower_path(path: &syn::Path) -> Option<TypeRef> {
    let last = path.segments.last()?;
    let mut prefix = Vec::with_capacity(path.segments.len() - 1);
    for segment in path.segments.iter().take(path.segments.len() - 1) {
        if !segment.arguments.is_empty() {
            return None;
        }
        prefix.push(segment.ident.to_string());
    }

    let qualifier = if prefix.is_empty() {
        // `::Foo` has no module to strip but still needs its leading colons.
        if path.leading_colon.is_some() {
            return None;
        }
        None
    } else if path.leading_colon.is_some() {
        Some(format!("::{}", prefix.join("::")))
    } else {
        Some(prefix.join("::"))
    };

    let args = match &last.arguments {
        PathArguments::None => Vec::new(),
        PathArguments::AngleBracketed(ab) => ab
            .args
            .iter()
            .map(lower_arg)
            .collect::<Option<Vec<_>>>()?,
        PathArguments::Parenthesized(_) => return None,
    };

    Some(TypeRef::Path {
        qualifier,
        name: last.ident.to_string(),
        args,
    })
}

fn lower_arg(arg: &GenericArgument) -> Option<GenericArg> {
    match arg {
        GenericArgument::Type(ty) => Some(GenericArg::Type(lower(ty))),
        GenericArgument::Lifetime(l) => Some(GenericArg::Lifetime(l.to_string())),
        GenericArgument::AssocType(assoc) if assoc.generics.is_none() => {
            Some(GenericArg::Binding {
                name: assoc.ident.to_string(),
                ty: lower(&assoc.ty),
            })
        }
        GenericArgument::Const(expr) => Some(GenericArg::Const(expr.to_token_stream().to_string())),
        _ => None,
    }
}

fn lower_bound(bound: &TypeParamBound) -> TypeRef {
    match bound {
        TypeParamBound::Trait(tb)
            if tb.lifetimes.is_none() && matches!(tb.modifier, TraitBoundModifier::None) =>
        {
            lower_path(&tb.path).unwrap_or_else(|| TypeRef::Verbatim(print_bound(bound)))
        }
        other => TypeRef::Verbatim(print_bound(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeRef {
        s.parse().expect("valid type")
    }

    #[test]
    fn test_parse_plain_path() {
        assert_eq!(parse("String"), TypeRef::named("String"));
    }

    #[test]
    fn test_parse_qualified_path() {
        let ty = parse("svc::Request");
        assert_eq!(ty, TypeRef::qualified("svc", "Request"));
        assert_eq!(ty.qualifier(), Some("svc"));
    }

    #[test]
    fn test_parse_leading_colon() {
        let ty = parse("::std::io::Error");
        assert_eq!(ty.qualifier(), Some("::std::io"));
        assert_eq!(ty.render("std::io"), "::std::io::Error");
    }

    #[test]
    fn test_parse_reference_to_slice() {
        let ty = parse("&'a mut [svc::Item]");
        assert_eq!(ty.render("svc"), "&'a mut [Item]");
    }

    #[test]
    fn test_parse_generic_binding() {
        let ty = parse("Box<dyn Iterator<Item = svc::Row> + Send>");
        assert_eq!(ty.render("svc"), "Box<dyn Iterator<Item = Row> + Send>");
    }

    #[test]
    fn test_parse_variadic() {
        let ty = parse("...svc::Tag");
        assert!(ty.is_variadic());
        assert_eq!(ty.render("svc"), "impl IntoIterator<Item = Tag>");
    }

    #[test]
    fn test_parse_double_variadic_is_rejected() {
        assert!("......u8".parse::<TypeRef>().is_err());
    }

    #[test]
    fn test_parse_invalid() {
        let err = "Vec<".parse::<TypeRef>().unwrap_err();
        assert_eq!(err.input, "Vec<");
    }

    #[test]
    fn test_parse_fn_pointer_is_verbatim() {
        let ty = parse("fn(u8) -> bool");
        assert_eq!(ty, TypeRef::Verbatim("fn(u8) -> bool".to_string()));
    }

    #[test]
    fn test_render_strips_inside_verbatim_types() {
        assert_eq!(parse("fn(svc::In) -> bool").render("svc"), "fn(In) -> bool");
        assert_eq!(parse("impl Fn(u8) -> svc::Out").render("svc"), "impl Fn(u8) -> Out");
        assert_eq!(
            parse("Box<dyn FnMut(&svc::Req) + Send>").render("svc"),
            "Box<dyn FnMut(&Req) + Send>"
        );
    }

    #[test]
    fn test_verbatim_keeps_model_notation() {
        assert_eq!(parse("fn ( svc :: In ) -> bool").to_string(), "fn(svc::In) -> bool");
    }

    #[test]
    fn test_render_is_idempotent() {
        for input in [
            "svc::Request",
            "&[svc::Item]",
            "Result<Vec<svc::Item>, svc::Error>",
            "HashMap<String, other::svc::Value>",
            "(u8, svc::Flag)",
            "[svc::Cell; 4]",
            "impl Fn(u8) -> svc::Out",
            "fn(&svc::In) -> Option<svc::Out>",
        ] {
            let once = parse(input).render("svc");
            let twice = parse(&once).render("svc");
            assert_eq!(once, twice, "render not idempotent for {input}");
        }
    }

    #[test]
    fn test_model_notation_round_trips() {
        for input in ["svc::Request", "&'static str", "...u8", "[u8; 16]", "()"] {
            assert_eq!(parse(input).to_string(), input);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let ty: TypeRef = serde_json::from_str("\"Option<svc::Id>\"").unwrap();
        assert_eq!(ty.render("svc"), "Option<Id>");
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"Option<svc::Id>\"");
    }
}
