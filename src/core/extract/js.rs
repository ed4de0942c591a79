//! JS/TS extractor.
//!
//! Parses the file with swc and walks the AST once. A call is only extracted
//! when its callee resolves to the translation API:
//!
//! - a named import from the configured module (`import { __ as t } from '@wordpress/i18n'`),
//!   resolved back to the canonical function name;
//! - a member call on a default or namespace import (`i18n.__()`);
//! - a member call on the configured global path (`wp.i18n.__()` or
//!   `window.wp.i18n.__()`).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use swc_common::SourceMap;
use swc_ecma_ast::{
    CallExpr, Callee, Expr, ImportSpecifier, Lit, MemberProp, Module, ModuleDecl,
    ModuleExportName, ModuleItem,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::data::{Location, Message};
use crate::core::extract::{
    CallSpec, Extract, SourceComment, attach_translator_comments, lookup_call,
    might_contain_call,
};
use crate::core::parsers::js::parse_script_source;

pub const DEFAULT_MODULE: &str = "@wordpress/i18n";
pub const DEFAULT_GLOBAL: &[&str] = &["wp", "i18n"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsExtractor {
    /// Module specifier that exports the translation functions.
    module: String,
    /// Global object path exposing the same functions, e.g. `wp.i18n`.
    global: Vec<String>,
}

impl Default for JsExtractor {
    fn default() -> Self {
        Self::new(
            DEFAULT_MODULE,
            DEFAULT_GLOBAL.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl JsExtractor {
    pub fn new(module: impl Into<String>, global: Vec<String>) -> Self {
        Self {
            module: module.into(),
            global,
        }
    }
}

impl Extract for JsExtractor {
    fn might_have_translations(&self, source: &str) -> bool {
        might_contain_call(source)
    }

    fn extract(&self, source: &str, filename: &str) -> Result<Vec<Message>> {
        let source_map = Arc::new(SourceMap::default());
        let parsed = parse_script_source(source.to_string(), filename, source_map)?;

        let bindings = ApiBindings::collect(&parsed.module, &self.module);
        let mut collector = CallCollector {
            bindings: &bindings,
            global: &self.global,
            source_map: &parsed.source_map,
            file_path: filename,
            sites: Vec::new(),
        };
        parsed.module.visit_with(&mut collector);

        let comments: Vec<SourceComment> = parsed
            .comments
            .in_source_order()
            .into_iter()
            .map(|c| SourceComment::new(c.span.lo.0 as usize, c.text.to_string()))
            .collect();
        let offsets: Vec<usize> = collector.sites.iter().map(|s| s.offset).collect();
        let translators = attach_translator_comments(&comments, &offsets, &[]);

        Ok(collector
            .sites
            .into_iter()
            .zip(translators)
            .filter_map(|(site, note)| site.message.map(|m| m.with_translators(note)))
            .collect())
    }
}

/// Identifiers bound to the translation API by import declarations.
#[derive(Debug, Default)]
struct ApiBindings {
    /// Local name -> canonical function (`import { _x as ctx }`).
    functions: HashMap<String, &'static CallSpec>,
    /// Default and namespace imports (`import i18n`, `import * as i18n`).
    namespaces: HashSet<String>,
}

impl ApiBindings {
    /// Imports are hoisted, so they are collected before walking any call.
    fn collect(module: &Module, specifier: &str) -> Self {
        let mut bindings = Self::default();

        for item in &module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
                continue;
            };
            if import.type_only || import.src.value.as_str() != Some(specifier) {
                continue;
            }

            for spec in &import.specifiers {
                match spec {
                    ImportSpecifier::Named(named) if !named.is_type_only => {
                        let local_name = named.local.sym.to_string();
                        let imported_name = named
                            .imported
                            .as_ref()
                            .map(|i| match i {
                                ModuleExportName::Ident(ident) => ident.sym.to_string(),
                                ModuleExportName::Str(s) => s.value.to_string_lossy().to_string(),
                            })
                            .unwrap_or_else(|| local_name.clone());

                        if let Some(call) = lookup_call(&imported_name) {
                            bindings.functions.insert(local_name, call);
                        }
                    }
                    ImportSpecifier::Named(_) => {}
                    ImportSpecifier::Default(default) => {
                        bindings.namespaces.insert(default.local.sym.to_string());
                    }
                    ImportSpecifier::Namespace(ns) => {
                        bindings.namespaces.insert(ns.local.sym.to_string());
                    }
                }
            }
        }

        bindings
    }
}

struct CallSite {
    offset: usize,
    /// `None` when the call was recognized but its arguments are not literals.
    message: Option<Message>,
}

struct CallCollector<'a> {
    bindings: &'a ApiBindings,
    global: &'a [String],
    source_map: &'a SourceMap,
    file_path: &'a str,
    sites: Vec<CallSite>,
}

impl CallCollector<'_> {
    /// Resolve a callee to the translation function it names, if any.
    fn resolve_callee(&self, callee: &Callee) -> Option<&'static CallSpec> {
        let Callee::Expr(expr) = callee else {
            return None;
        };

        match unwrap_paren(expr) {
            Expr::Ident(ident) => self.bindings.functions.get(ident.sym.as_str()).copied(),
            Expr::Member(member) => {
                let MemberProp::Ident(prop) = &member.prop else {
                    return None;
                };
                let call = lookup_call(prop.sym.as_str())?;
                let object = member_path(&member.obj)?;
                self.is_api_object(&object).then_some(call)
            }
            _ => None,
        }
    }

    fn is_api_object(&self, path: &[&str]) -> bool {
        if let [name] = path
            && self.bindings.namespaces.contains(*name)
        {
            return true;
        }

        if self.global.is_empty() {
            return false;
        }
        let path = match path.split_first() {
            Some((&"window", rest)) => rest,
            _ => path,
        };
        path.iter().copied().eq(self.global.iter().map(String::as_str))
    }

    fn location(&self, call: &CallExpr) -> Location {
        let loc = self.source_map.lookup_char_pos(call.span.lo);
        Location::new(self.file_path, loc.line, loc.col.0)
    }
}

impl Visit for CallCollector<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(call) = self.resolve_callee(&node.callee) {
            let args: Vec<Option<String>> = node
                .args
                .iter()
                .map(|arg| match arg.spread {
                    Some(_) => None,
                    None => literal_string(&arg.expr),
                })
                .collect();

            let message = call.build(&args, self.location(node));
            self.sites.push(CallSite {
                offset: node.span.lo.0 as usize,
                message,
            });
        }

        // Calls may nest, e.g. `sprintf(__('%s items'), n)`.
        node.visit_children_with(self);
    }
}

/// Dotted path of a plain member chain: `window.wp.i18n` -> `["window", "wp", "i18n"]`.
fn member_path(expr: &Expr) -> Option<Vec<&str>> {
    match unwrap_paren(expr) {
        Expr::Ident(ident) => Some(vec![ident.sym.as_str()]),
        Expr::Member(member) => {
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            let mut path = member_path(&member.obj)?;
            path.push(prop.sym.as_str());
            Some(path)
        }
        _ => None,
    }
}

fn unwrap_paren(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_paren(&paren.expr),
        _ => expr,
    }
}

/// Unwrap TypeScript-specific expression wrappers to get the inner expression.
fn unwrap_ts_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::TsAs(ts_as) => unwrap_ts_expr(&ts_as.expr),
        Expr::TsConstAssertion(ts_const) => unwrap_ts_expr(&ts_const.expr),
        Expr::TsSatisfies(ts_sat) => unwrap_ts_expr(&ts_sat.expr),
        Expr::Paren(paren) => unwrap_ts_expr(&paren.expr),
        _ => expr,
    }
}

/// String literal or expression-free template literal.
fn literal_string(expr: &Expr) -> Option<String> {
    match unwrap_ts_expr(expr) {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|s| s.as_str().map(|s| s.to_string())),
        _ => None,
    }
}
