use std::collections::BTreeSet;

use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::visit::{self, Visit};
use syn::{Item, ItemUse, UseTree, Visibility};

use crate::{Error, ImportCollector, Result};

/// Standard library items imported automatically when referenced by their
/// bare name and not otherwise in scope.
pub const KNOWN_IMPORTS: &[(&str, &str)] = &[
    ("Arc", "std::sync"),
    ("Mutex", "std::sync"),
    ("RwLock", "std::sync"),
    ("HashMap", "std::collections"),
    ("HashSet", "std::collections"),
    ("BTreeMap", "std::collections"),
    ("BTreeSet", "std::collections"),
    ("VecDeque", "std::collections"),
    ("Rc", "std::rc"),
    ("RefCell", "std::cell"),
    ("Cell", "std::cell"),
    ("Duration", "std::time"),
    ("Instant", "std::time"),
    ("Path", "std::path"),
    ("PathBuf", "std::path"),
    ("Cow", "std::borrow"),
    ("PhantomData", "std::marker"),
    ("Pin", "std::pin"),
    ("fmt", "std"),
];

/// Traits whose imports are kept without a by-name reference, since method
/// calls use them implicitly.
pub const RETAINED_TRAITS: &[&str] = &[
    "Read", "Write", "BufRead", "Seek", "FromStr", "Hash", "Hasher", "Future", "Stream",
    "StreamExt", "FutureExt", "Iterator",
];

/// Drop unused `use` declarations and add missing well-known ones.
///
/// Each module body is reconciled on its own. The result is valid Rust but
/// not laid out; pass it through [`format_source`](super::format_source).
pub fn reconcile_imports(src: &str) -> Result<String> {
    let mut file = syn::parse_file(src).map_err(|e| Error::imports(src, e))?;
    reconcile_scope(&mut file.items).map_err(|e| Error::imports(src, e))?;
    Ok(file.to_token_stream().to_string())
}

/// Reconcile one scope. Returns what the scope reaches in its parent.
fn reconcile_scope(items: &mut Vec<Item>) -> syn::Result<ParentRefs> {
    let mut usage = Usage::default();
    let mut child_glob = false;
    for item in items.iter_mut() {
        match item {
            Item::Mod(module) => {
                for attr in &module.attrs {
                    usage.visit_attribute(attr);
                }
                if let Some((_, inner)) = &mut module.content {
                    let from_child = reconcile_scope(inner)?;
                    usage.names.extend(from_child.names);
                    child_glob |= from_child.glob;
                }
            }
            other => usage.visit_item(other),
        }
    }

    // A child's `use super::*` reaches every import of this scope.
    if !child_glob {
        items.retain_mut(|item| match item {
            Item::Use(item_use) => prune_use(item_use, &usage.names),
            _ => true,
        });
    }

    let bindings = Bindings::of(items);
    insert_missing(items, &usage.names, &bindings)?;
    Ok(ParentRefs {
        names: usage.super_refs,
        glob: bindings.parent_glob,
    })
}

/// What a child scope uses from its parent.
struct ParentRefs {
    /// Segment following a leading `super`.
    names: BTreeSet<String>,
    /// Whether the child imports `super::*`.
    glob: bool,
}

/// Names referenced in a scope.
#[derive(Default)]
struct Usage {
    /// First segment of every path.
    names: BTreeSet<String>,
    /// Segment following a leading `super`.
    super_refs: BTreeSet<String>,
}

impl Usage {
    /// Record every identifier in unparsed tokens.
    fn scan(&mut self, tokens: TokenStream) {
        for tree in tokens {
            match tree {
                TokenTree::Ident(ident) => {
                    self.names.insert(ident.to_string());
                }
                TokenTree::Group(group) => self.scan(group.stream()),
                _ => {}
            }
        }
    }
}

impl<'ast> Visit<'ast> for Usage {
    fn visit_path(&mut self, path: &'ast syn::Path) {
        let mut segments = path.segments.iter();
        if let Some(first) = segments.next() {
            if first.ident == "super" {
                if let Some(next) = segments.next() {
                    self.super_refs.insert(next.ident.to_string());
                }
            } else {
                self.names.insert(first.ident.to_string());
            }
        }
        visit::visit_path(self, path);
    }

    fn visit_item_use(&mut self, item: &'ast ItemUse) {
        // `use io::Write` keeps `io` alive.
        if let UseTree::Path(path) = &item.tree {
            self.names.insert(path.ident.to_string());
        }
    }

    // Nested modules are their own scope.
    fn visit_item_mod(&mut self, _: &'ast syn::ItemMod) {}

    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        self.scan(mac.tokens.clone());
        visit::visit_macro(self, mac);
    }

    fn visit_meta_list(&mut self, list: &'ast syn::MetaList) {
        self.scan(list.tokens.clone());
        visit::visit_meta_list(self, list);
    }
}

/// Prune a `use` item. Returns whether anything is left.
fn prune_use(item: &mut ItemUse, names: &BTreeSet<String>) -> bool {
    if !matches!(item.vis, Visibility::Inherited) {
        return true;
    }
    prune_tree(&mut item.tree, None, names)
}

fn prune_tree(tree: &mut UseTree, parent: Option<&str>, names: &BTreeSet<String>) -> bool {
    match tree {
        UseTree::Path(path) => {
            let ident = path.ident.to_string();
            let keep = prune_tree(&mut path.tree, Some(&ident), names);
            unwrap_single(&mut path.tree);
            keep
        }
        UseTree::Name(name) if name.ident == "self" => parent.is_some_and(|p| is_used(p, names)),
        UseTree::Name(name) => is_used(&name.ident.to_string(), names),
        UseTree::Rename(rename) => rename.rename == "_" || is_used(&rename.rename.to_string(), names),
        UseTree::Glob(_) => true,
        UseTree::Group(group) => {
            let items = std::mem::take(&mut group.items);
            group.items = items
                .into_iter()
                .filter_map(|mut tree| prune_tree(&mut tree, parent, names).then_some(tree))
                .collect();
            !group.items.is_empty()
        }
    }
}

fn is_used(binding: &str, names: &BTreeSet<String>) -> bool {
    names.contains(binding) || RETAINED_TRAITS.contains(&binding)
}

/// `a::{b}` becomes `a::b`.
fn unwrap_single(tree: &mut Box<UseTree>) {
    let UseTree::Group(group) = tree.as_mut() else {
        return;
    };
    if group.items.len() != 1 {
        return;
    }
    let is_self = matches!(group.items.first(), Some(UseTree::Name(n)) if n.ident == "self");
    if is_self {
        return;
    }
    if let Some(only) = group.items.pop() {
        **tree = only.into_value();
    }
}

/// Names a scope binds through its own items and `use` declarations.
#[derive(Default)]
struct Bindings {
    names: BTreeSet<String>,
    /// A glob import from anywhere other than the parent module.
    foreign_glob: bool,
    /// A `super::*` import.
    parent_glob: bool,
}

impl Bindings {
    fn of(items: &[Item]) -> Self {
        let mut bindings = Self::default();
        for item in items {
            let ident = match item {
                Item::Const(i) => Some(&i.ident),
                Item::Enum(i) => Some(&i.ident),
                Item::ExternCrate(i) => Some(i.rename.as_ref().map_or(&i.ident, |(_, r)| r)),
                Item::Fn(i) => Some(&i.sig.ident),
                Item::Macro(i) => i.ident.as_ref(),
                Item::Mod(i) => Some(&i.ident),
                Item::Static(i) => Some(&i.ident),
                Item::Struct(i) => Some(&i.ident),
                Item::Trait(i) => Some(&i.ident),
                Item::TraitAlias(i) => Some(&i.ident),
                Item::Type(i) => Some(&i.ident),
                Item::Union(i) => Some(&i.ident),
                Item::Use(i) => {
                    bindings.collect(&i.tree, None);
                    None
                }
                _ => None,
            };
            if let Some(ident) = ident {
                bindings.names.insert(ident.to_string());
            }
        }
        bindings
    }

    fn collect(&mut self, tree: &UseTree, parent: Option<&str>) {
        match tree {
            UseTree::Path(path) => {
                let ident = path.ident.to_string();
                self.collect(&path.tree, Some(&ident));
            }
            UseTree::Name(name) if name.ident == "self" => {
                if let Some(parent) = parent {
                    self.names.insert(parent.to_string());
                }
            }
            UseTree::Name(name) => {
                self.names.insert(name.ident.to_string());
            }
            UseTree::Rename(rename) => {
                self.names.insert(rename.rename.to_string());
            }
            UseTree::Glob(_) if parent == Some("super") => self.parent_glob = true,
            UseTree::Glob(_) => self.foreign_glob = true,
            UseTree::Group(group) => {
                for tree in &group.items {
                    self.collect(tree, parent);
                }
            }
        }
    }
}

/// Add `use` declarations for referenced well-known names that are not bound.
///
/// Scopes with glob imports from outside the parent are left alone; the glob
/// may already provide a different item of the same name. A parent item that
/// shares a name with a well-known import has to be imported explicitly.
fn insert_missing(
    items: &mut Vec<Item>,
    names: &BTreeSet<String>,
    bindings: &Bindings,
) -> syn::Result<()> {
    if bindings.foreign_glob {
        return Ok(());
    }

    let mut missing = ImportCollector::new();
    for (name, module) in KNOWN_IMPORTS {
        if names.contains(*name) && !bindings.names.contains(*name) {
            missing.add(module, name);
        }
    }
    if missing.is_empty() {
        return Ok(());
    }

    let at = items
        .iter()
        .rposition(|item| matches!(item, Item::Use(_)))
        .map_or(0, |i| i + 1);
    let uses = missing
        .render()
        .iter()
        .map(|line| syn::parse_str::<Item>(line))
        .collect::<syn::Result<Vec<_>>>()?;
    items.splice(at..at, uses);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format_source;

    fn reconcile(src: &str) -> String {
        format_source(&reconcile_imports(src).unwrap()).unwrap()
    }

    #[test]
    fn test_removes_unused_import() {
        let out = reconcile("use std::fmt::Display;\nfn a() {}");
        assert_eq!(out, "fn a() {}\n");
    }

    #[test]
    fn test_keeps_used_import() {
        let out = reconcile("use std::sync::Arc;\nstruct S(Arc<u8>);");
        assert!(out.starts_with("use std::sync::Arc;\n"));
    }

    #[test]
    fn test_prunes_group_members() {
        let out = reconcile("use std::sync::{Arc, Mutex};\nstruct S(Mutex<u8>);");
        assert!(out.starts_with("use std::sync::Mutex;\n"));
        assert!(!out.contains("Arc"));
    }

    #[test]
    fn test_keeps_self_in_group() {
        let out = reconcile("use std::io::{self, Cursor};\nfn a() -> io::Result<()> { Ok(()) }");
        assert!(out.contains("use std::io::{self};") || out.contains("use std::io::{self}"));
        assert!(!out.contains("Cursor"));
    }

    #[test]
    fn test_keeps_traits_globs_and_reexports() {
        let src = "use std::io::Write;\nuse crate::prelude::*;\npub use std::fmt::Debug;\nuse std::fmt::Write as _;\nfn a() {}";
        let out = reconcile(src);
        assert!(out.contains("use std::io::Write;"));
        assert!(out.contains("use crate::prelude::*;"));
        assert!(out.contains("pub use std::fmt::Debug;"));
        assert!(out.contains("use std::fmt::Write as _;"));
    }

    #[test]
    fn test_inserts_missing_std_import() {
        let out = reconcile("struct S { m: HashMap<String, Arc<u8>> }");
        assert!(out.contains("use std::collections::HashMap;"));
        assert!(out.contains("use std::sync::Arc;"));
    }

    #[test]
    fn test_does_not_insert_declared_name() {
        let out = reconcile("struct Duration;\nfn a(_: Duration) {}");
        assert!(!out.contains("use "));
    }

    #[test]
    fn test_glob_scope_is_left_alone() {
        let out = reconcile("use chrono::*;\nfn a(_: Duration) {}");
        assert!(!out.contains("std::time"));
    }

    #[test]
    fn test_scopes_are_independent() {
        let src = "use std::sync::Arc;\npub mod inner { use std::sync::Arc; pub struct S(pub Arc<u8>); }";
        let out = reconcile(src);
        assert_eq!(out.matches("use std::sync::Arc;").count(), 1);
        assert!(out.contains("pub mod inner {\n    use std::sync::Arc;"));
    }

    #[test]
    fn test_super_reference_keeps_parent_import() {
        let src = "use std::sync::Arc;\nmod inner { pub struct S(pub super::Arc<u8>); }";
        let out = reconcile(src);
        assert!(out.starts_with("use std::sync::Arc;"));
    }

    #[test]
    fn test_macro_tokens_count_as_usage() {
        let src = "use std::collections::BTreeMap;\nfn a() { let _m = vec![BTreeMap::<u8, u8>::new()]; }";
        let out = reconcile(src);
        assert!(out.contains("use std::collections::BTreeMap;"));
    }

    #[test]
    fn test_derive_arguments_count_as_usage() {
        let src = "use serde::Serialize;\n#[derive(Serialize)]\nstruct S;";
        assert!(reconcile(src).contains("use serde::Serialize;"));
    }

    #[test]
    fn test_child_glob_keeps_parent_imports() {
        let src = "pub mod svc { use std::num::NonZeroU8; use std::fmt::Display; \
                   #[cfg(test)] mod tests { use super::*; fn f() -> NonZeroU8 { NonZeroU8::MIN } } }";
        let out = reconcile(src);
        assert!(out.contains("use std::num::NonZeroU8;"));
        assert!(out.contains("use std::fmt::Display;"));
    }

    #[test]
    fn test_parent_glob_does_not_block_insertion() {
        let out = reconcile("use super::*;\nstruct S(Arc<u8>);");
        assert!(out.contains("use super::*;"));
        assert!(out.contains("use std::sync::Arc;"));
    }

    #[test]
    fn test_explicit_parent_import_blocks_insertion() {
        let out = reconcile("use super::{*, Duration};\nfn a(_: Duration) {}");
        assert!(out.contains("use super::{*, Duration};"));
        assert!(!out.contains("std::time"));
    }

    #[test]
    fn test_invalid_source_is_reported() {
        let err = reconcile_imports("fn broken( {").unwrap_err();
        assert!(matches!(*err, Error::Imports { .. }));
        assert_eq!(err.raw_source(), Some("fn broken( {"));
    }
}
