//! Layering lint for the landlord backend.
//!
//! Every source file under `backend/src` belongs to one layer, decided by its
//! path. Each layer lists the backend modules and external crates its
//! production code may not name. Tier rules live in `domain`. The HTTP
//! surface (`inbound`, `middleware`, `doc.rs`) and the adapters (`outbound`)
//! reach each other only through domain ports. Startup seeding
//! (`tier_seeding`) and `settings.rs` sit beside them. The binaries
//! (`main.rs`, `server/`, `bin/`) are the composition root.
//!
//! `self::` and `super::` paths are resolved against the file's module path,
//! so `use super::tier_seeding` inside `domain` stays inside `domain`. Items
//! marked `#[cfg(test)]`, `tests.rs` files and `*_tests.rs` files are test
//! wiring and may assemble any adapter.
//!
//! Run it with `cargo run -p architecture-lint [BACKEND_DIR]`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library crate name of the backend, as seen from its binaries.
const BACKEND_CRATE: &str = "landlord_backend";

/// Top-level modules of the backend library and binary.
const TOP_LEVEL_MODULES: [&str; 8] = [
    "domain",
    "inbound",
    "outbound",
    "middleware",
    "doc",
    "settings",
    "tier_seeding",
    "server",
];

const HTTP_CRATES: [&str; 5] = [
    "actix",
    "actix_service",
    "actix_web",
    "awc",
    "utoipa_swagger_ui",
];
const DATABASE_CRATES: [&str; 5] = [
    "diesel",
    "diesel_async",
    "diesel_migrations",
    "bb8",
    "postgres",
];
const SURFACE_CRATES: [&str; 3] = ["utoipa", "ortho_config", "clap"];

/// A boundary violation in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    /// Which rule was broken.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Errors returned by the lint.
#[derive(Debug, thiserror::Error)]
pub enum ArchitectureLintError {
    /// Walking or reading the source tree failed.
    #[error("I/O error while linting architecture: {0}")]
    Io(#[from] io::Error),
    /// A file could not be parsed or placed in a layer.
    #[error("failed to parse {} while linting architecture: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
    /// At least one rule was broken.
    #[error("architecture boundary violations:\n{}", render_violations(.0))]
    Violations(Vec<Violation>),
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Backend layer a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Tier entities, services and ports.
    Domain,
    /// HTTP handlers, middleware and the OpenAPI document.
    Inbound,
    /// Diesel and in-memory adapters.
    Outbound,
    /// Startup seeding of the baseline tiers.
    Seeding,
    /// Environment-driven configuration.
    Settings,
    /// Binaries wiring adapters into the HTTP server.
    Server,
}

impl Layer {
    /// Layer of a path relative to `backend/src`, if it has one.
    pub fn of(relative_path: &Path) -> Option<Self> {
        let first = relative_path.components().next()?.as_os_str().to_str()?;
        let layer = match first {
            "domain" => Self::Domain,
            "inbound" | "middleware" | "doc.rs" => Self::Inbound,
            "outbound" => Self::Outbound,
            "tier_seeding" => Self::Seeding,
            "settings.rs" => Self::Settings,
            "server" | "bin" | "main.rs" => Self::Server,
            _ => return None,
        };
        Some(layer)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Seeding => "tier_seeding",
            Self::Settings => "settings",
            Self::Server => "server",
        }
    }

    /// Backend module prefixes production code in this layer may not name.
    fn forbidden_modules(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Domain => &[
                &["inbound"],
                &["outbound"],
                &["middleware"],
                &["doc"],
                &["settings"],
                &["tier_seeding"],
                &["server"],
            ],
            Self::Inbound => &[
                &["outbound", "memory"],
                &["outbound", "persistence"],
                &["outbound"],
                &["tier_seeding"],
                &["server"],
            ],
            Self::Outbound => &[
                &["inbound"],
                &["middleware"],
                &["doc"],
                &["tier_seeding"],
                &["server"],
            ],
            Self::Seeding => &[
                &["inbound"],
                &["outbound"],
                &["middleware"],
                &["doc"],
                &["server"],
            ],
            Self::Settings => &[
                &["outbound", "memory"],
                &["inbound"],
                &["middleware"],
                &["doc"],
                &["tier_seeding"],
                &["server"],
            ],
            Self::Server => &[],
        }
    }

    fn forbids_crate(self, root: &str) -> bool {
        let http = HTTP_CRATES.contains(&root);
        let database = DATABASE_CRATES.contains(&root);
        let surface = SURFACE_CRATES.contains(&root);
        match self {
            Self::Domain => http || database || surface,
            Self::Inbound => database,
            Self::Outbound => http || root == "utoipa",
            Self::Seeding | Self::Settings => http || database,
            Self::Server => database,
        }
    }
}

/// Lint the backend sources on disk.
///
/// `backend_dir` is the `backend/` directory at the repository root.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let sources = collect_lint_sources(&backend_dir.join("src"))?;
    lint_sources(&sources)
}

/// Lint in-memory sources.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(lint_source(source)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn lint_source(source: &LintSource) -> Result<Vec<Violation>, ArchitectureLintError> {
    let parse_error = |message: String| ArchitectureLintError::Parse {
        file: source.file.clone(),
        message,
    };
    let layer = Layer::of(&source.file)
        .ok_or_else(|| parse_error("file is not in any backend layer".to_owned()))?;
    let parsed = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;
    if is_test_file(&source.file) {
        return Ok(Vec::new());
    }

    let mut collector = DependencyCollector::new(module_path_of(&source.file, layer));
    collector.visit_file(&parsed);

    let messages: BTreeSet<String> = collector
        .dependencies
        .iter()
        .filter_map(|dependency| dependency.violation_in(layer))
        .collect();
    Ok(messages
        .into_iter()
        .map(|message| Violation {
            file: source.file.clone(),
            message,
        })
        .collect())
}

fn is_test_file(relative_path: &Path) -> bool {
    relative_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == "tests" || stem.ends_with("_tests"))
}

/// Module path of a file inside its crate, e.g. `domain/ports/mod.rs` is
/// `domain::ports`. Binaries under `bin/` are crate roots of their own.
fn module_path_of(relative_path: &Path, layer: Layer) -> Vec<String> {
    let mut segments: Vec<String> = relative_path
        .with_extension("")
        .components()
        .filter_map(|component| component.as_os_str().to_str().map(str::to_owned))
        .collect();
    if segments.last().is_some_and(|last| last == "mod") {
        segments.pop();
    }
    let is_crate_root =
        segments.as_slice() == ["main"] || segments.first().is_some_and(|first| first == "bin");
    if layer == Layer::Server && is_crate_root {
        segments.clear();
    }
    segments
}

/// Where a path points once `crate`, `self` and `super` are resolved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Dependency {
    /// A module path inside the backend.
    Backend(Vec<String>),
    /// The root name of an external crate.
    External(String),
}

impl Dependency {
    fn violation_in(&self, layer: Layer) -> Option<String> {
        match self {
            Self::Backend(path) => layer
                .forbidden_modules()
                .iter()
                .find(|prefix| starts_with(path, prefix))
                .map(|prefix| {
                    format!(
                        "{} module must not depend on crate::{}",
                        layer.name(),
                        prefix.join("::")
                    )
                }),
            Self::External(root) => layer.forbids_crate(root).then(|| {
                format!(
                    "{} module must not depend on external crate `{root}`",
                    layer.name()
                )
            }),
        }
    }
}

fn starts_with(path: &[String], prefix: &[&str]) -> bool {
    path.len() >= prefix.len() && path.iter().zip(prefix).all(|(have, want)| have == want)
}

fn resolve(module_path: &[String], segments: &[String]) -> Option<Dependency> {
    let (first, rest) = segments.split_first()?;
    match first.as_str() {
        "crate" => Some(Dependency::Backend(rest.to_vec())),
        BACKEND_CRATE => Some(Dependency::Backend(rest.to_vec())),
        "self" => Some(Dependency::Backend(
            module_path.iter().chain(rest).cloned().collect(),
        )),
        "super" => {
            let mut base = module_path.to_vec();
            let mut remaining = segments;
            while let Some((head, tail)) = remaining.split_first() {
                if head != "super" {
                    break;
                }
                base.pop();
                remaining = tail;
            }
            base.extend(remaining.iter().cloned());
            Some(Dependency::Backend(base))
        }
        root if TOP_LEVEL_MODULES.contains(&root) && !rest.is_empty() => {
            Some(Dependency::Backend(segments.to_vec()))
        }
        root => Some(Dependency::External(root.to_owned())),
    }
}

fn is_test_only(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

/// Collects resolved dependencies, skipping test-only items.
struct DependencyCollector {
    module_path: Vec<String>,
    dependencies: BTreeSet<Dependency>,
}

impl DependencyCollector {
    fn new(module_path: Vec<String>) -> Self {
        Self {
            module_path,
            dependencies: BTreeSet::new(),
        }
    }

    fn record(&mut self, segments: &[String]) {
        if let Some(dependency) = resolve(&self.module_path, segments) {
            self.dependencies.insert(dependency);
        }
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                prefix.push(ident.to_string());
                self.record(prefix);
                prefix.pop();
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.record(prefix);
                prefix.pop();
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for DependencyCollector {
    fn visit_item(&mut self, node: &'ast syn::Item) {
        let attrs = match node {
            syn::Item::Const(item) => &item.attrs,
            syn::Item::Enum(item) => &item.attrs,
            syn::Item::Fn(item) => &item.attrs,
            syn::Item::Impl(item) => &item.attrs,
            syn::Item::Mod(item) => &item.attrs,
            syn::Item::Static(item) => &item.attrs,
            syn::Item::Struct(item) => &item.attrs,
            syn::Item::Trait(item) => &item.attrs,
            syn::Item::Type(item) => &item.attrs,
            syn::Item::Use(item) => &item.attrs,
            _ => return syn::visit::visit_item(self, node),
        };
        if !is_test_only(attrs) {
            syn::visit::visit_item(self, node);
        }
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_path.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module_path.pop();
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, &mut Vec::new());
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        self.record(&segments);
        syn::visit::visit_path(self, node);
    }
}

/// Source roots linted under `backend/src`. `lib.rs` only declares modules.
const LINT_ROOTS: [&str; 10] = [
    "domain",
    "inbound",
    "outbound",
    "middleware",
    "tier_seeding",
    "server",
    "bin",
    "doc.rs",
    "settings.rs",
    "main.rs",
];

fn collect_lint_sources(src_dir: &Path) -> Result<Vec<LintSource>, ArchitectureLintError> {
    let mut sources = Vec::new();
    for root in LINT_ROOTS {
        let path = src_dir.join(root);
        if path.is_dir() {
            collect_dir(src_dir, &path, &mut sources)?;
        } else if path.is_file() {
            push_source(src_dir, &path, &mut sources)?;
        }
    }
    Ok(sources)
}

fn collect_dir(
    src_dir: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_dir(src_dir, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            push_source(src_dir, &path, sources)?;
        }
    }
    Ok(())
}

fn push_source(
    src_dir: &Path,
    path: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let file = path
        .strip_prefix(src_dir)
        .map_err(|err| ArchitectureLintError::Parse {
            file: path.to_path_buf(),
            message: err.to_string(),
        })?
        .to_path_buf();
    sources.push(LintSource {
        file,
        contents: fs::read_to_string(path)?,
    });
    Ok(())
}
