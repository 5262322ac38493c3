//! ExtractorManager - Public API for a type extraction run
//!
//! Owns every piece of run-scoped state (type registry, module map, pending
//! references, diagnostics) and drives the recursive resolution: parsing a
//! file queues the imported types it mentions, and each queued type pulls in
//! every compilation unit of its package until nothing new turns up.

use crate::config::ExtractorConfig;
use crate::error::{Diagnostic, ExtractError, Result};
use crate::extractors::base::{InterfaceDecl, StructDecl, TypeBody, TypeId, TypeKey, TypeShape};
use crate::extractors::go::GoExtractor;
use crate::locator;
use crate::module_map::{ModuleDescriptor, ModuleMap, PackageDescriptor};
use crate::registry::{NamedEntry, TypeRegistry};
use crate::utils::paths::{go_source_files, to_relative_unix_style};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tree_sitter::Parser;

/// What `parse_file` did with one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub package_name: String,
    pub import_path: String,
    pub structs: Vec<TypeId>,
    pub interfaces: Vec<TypeId>,
    /// The file had been parsed before; nothing was re-registered
    pub already_parsed: bool,
}

/// A named type whose declaring package still has to be parsed.
#[derive(Debug, Clone)]
struct PendingRef {
    key: TypeKey,
    /// Module of the file that mentioned the type
    module: ModuleDescriptor,
    referenced_from: PathBuf,
}

/// Manager for one extraction run
pub struct ExtractorManager {
    config: ExtractorConfig,
    parser: Parser,
    registry: TypeRegistry,
    modules: ModuleMap,
    pending: VecDeque<PendingRef>,
    /// Package directories whose compilation units were all enumerated
    exhausted: HashSet<PathBuf>,
    diagnostics: Vec<Diagnostic>,
}

impl ExtractorManager {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let parser =
            crate::language::new_parser("go").map_err(|e| ExtractError::Language(e.to_string()))?;
        Ok(Self {
            config,
            parser,
            registry: TypeRegistry::new(),
            modules: ModuleMap::new(),
            pending: VecDeque::new(),
            exhausted: HashSet::new(),
            diagnostics: Vec::new(),
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Parse `roots`, then resolve everything they reference.
    pub fn extract<P: AsRef<Path>>(&mut self, roots: impl IntoIterator<Item = P>) -> Result<()> {
        let mut root_count = 0;
        for root in roots {
            self.parse_file(root.as_ref())?;
            root_count += 1;
        }
        let pulled_in = self.resolve_pending()?;

        info!(
            "Extraction finished: {} roots, {} dependency files, {} types, {} diagnostics",
            root_count,
            pulled_in,
            self.registry.len(),
            self.diagnostics.len()
        );
        Ok(())
    }

    /// Parse one compilation unit and register its declarations.
    ///
    /// Files already parsed in this run are not parsed again; their summary
    /// is rebuilt from the registry instead.
    pub fn parse_file(&mut self, path: &Path) -> Result<FileSummary> {
        let path = fs::canonicalize(path).map_err(|e| ExtractError::io(path, e))?;
        if self.modules.is_parsed(&path) {
            debug!("Already parsed {}", path.display());
            return self.summary_of_parsed(&path);
        }

        let dir = path
            .parent()
            .ok_or_else(|| ExtractError::invariant("canonical file path has no parent"))?
            .to_path_buf();
        let module = self.module_for(&path, &dir)?;
        let import_path = locator::import_path_for_dir(&module, &dir)?;

        let content = fs::read_to_string(&path).map_err(|e| ExtractError::io(&path, e))?;
        let tree = self
            .parser
            .parse(&content, None)
            .ok_or_else(|| ExtractError::invariant(format!("no tree for {}", path.display())))?;
        let extractor = GoExtractor::new(&path, content);
        let declarations = extractor.extract(&tree, &import_path)?;

        let referenced: Vec<TypeKey> = declarations
            .referenced_types()
            .into_iter()
            .filter(|named| !named.is_builtin())
            .map(|named| named.key())
            .collect();

        let mut structs = Vec::with_capacity(declarations.structs.len());
        for decl in declarations.structs {
            let key = decl.key();
            let decl = self.intern_struct(decl);
            structs.push(self.registry.set(&key, TypeBody::Struct(decl)));
        }
        let mut interfaces = Vec::with_capacity(declarations.interfaces.len());
        for decl in declarations.interfaces {
            let key = decl.key();
            let decl = self.intern_interface(decl);
            interfaces.push(self.registry.set(&key, TypeBody::Interface(decl)));
        }

        let package_name = declarations.scope.package_name;
        let relative = match to_relative_unix_style(&dir, &module.root)? {
            rel if rel.is_empty() => ".".to_string(),
            rel => rel,
        };
        let package = self
            .modules
            .package_mut(&module.identity, &relative, &package_name, &import_path, &dir)
            .ok_or_else(|| {
                ExtractError::invariant(format!("module {} not registered", module.identity))
            })?;
        for id in &structs {
            package.add_struct(*id);
        }
        for id in &interfaces {
            package.add_interface(*id);
        }
        self.modules.mark_parsed(&module.identity, &relative, &path);
        self.diagnostics.extend(declarations.diagnostics);

        for key in referenced {
            self.enqueue(key, &import_path, &module, &path);
        }

        debug!(
            "Parsed {} ({}): {} structs, {} interfaces",
            path.display(),
            import_path,
            structs.len(),
            interfaces.len()
        );

        Ok(FileSummary {
            path,
            package_name,
            import_path,
            structs,
            interfaces,
            already_parsed: false,
        })
    }

    /// Drain the pending queue. Returns how many files were parsed.
    pub fn resolve_pending(&mut self) -> Result<usize> {
        let mut parsed = 0;

        while let Some(pending) = self.pending.pop_front() {
            if self.registry.body(&pending.key).is_some() {
                continue;
            }

            let dir = locator::package_dir(
                &pending.module,
                &pending.key.import_path,
                self.config.use_vendor,
                &pending.referenced_from,
            )?;
            if !self.exhausted.insert(dir.clone()) {
                // Package fully parsed already: the name is an alias, a scalar
                // or a generic declaration
                debug!("{} has no struct or interface body", pending.key);
                continue;
            }

            let files = go_source_files(&dir, self.config.include_test_files)?;
            info!(
                "Resolving {}: {} files in {}",
                pending.key.import_path,
                files.len(),
                dir.display()
            );
            for file in files {
                if !self.parse_file(&file)?.already_parsed {
                    parsed += 1;
                }
            }
        }

        Ok(parsed)
    }

    /// Hand the run state over to codegen.
    pub fn into_extraction(self) -> Extraction {
        Extraction {
            registry: self.registry,
            modules: self.modules,
            diagnostics: self.diagnostics,
        }
    }

    fn module_for(&mut self, file: &Path, dir: &Path) -> Result<ModuleDescriptor> {
        if let Some(module) = self.modules.module_of_dir(dir) {
            return Ok(module.clone());
        }
        let module = locator::locate_module(
            file,
            &self.config.manifest_file,
            self.config.search_up_limit,
        )?;
        Ok(self.modules.add_module(module, dir).clone())
    }

    fn enqueue(&mut self, key: TypeKey, current: &str, module: &ModuleDescriptor, from: &Path) {
        if self.registry.body(&key).is_some() {
            return;
        }
        if key.import_path == current && !self.config.resolve_local_types {
            return;
        }
        if self.config.is_opaque(&key.import_path, &module.identity) {
            debug!("Leaving {} unresolved (opaque import path)", key);
            return;
        }
        self.pending.push_back(PendingRef {
            key,
            module: module.clone(),
            referenced_from: from.to_path_buf(),
        });
    }

    fn intern_struct(&mut self, decl: StructDecl<TypeShape>) -> StructDecl {
        let registry = &mut self.registry;
        decl.map_types(|shape| Ok::<_, Infallible>(registry.intern(&shape)))
            .unwrap_or_else(|never| match never {})
    }

    fn intern_interface(&mut self, decl: InterfaceDecl<TypeShape>) -> InterfaceDecl {
        let registry = &mut self.registry;
        decl.map_types(|shape| Ok::<_, Infallible>(registry.intern(&shape)))
            .unwrap_or_else(|never| match never {})
    }

    fn summary_of_parsed(&self, path: &Path) -> Result<FileSummary> {
        let package = self.modules.package_of_file(path).ok_or_else(|| {
            ExtractError::invariant(format!("{} parsed but has no package", path.display()))
        })?;
        let declared_here = |id: &&TypeId| {
            self.registry
                .named(**id)
                .and_then(|entry| entry.body.as_ref())
                .is_some_and(|body| match body {
                    TypeBody::Struct(s) => s.file_path == path,
                    TypeBody::Interface(i) => i.file_path == path,
                })
        };
        Ok(FileSummary {
            path: path.to_path_buf(),
            package_name: package.package_name.clone(),
            import_path: package.import_path.clone(),
            structs: package.structs.iter().filter(declared_here).copied().collect(),
            interfaces: package.interfaces.iter().filter(declared_here).copied().collect(),
            already_parsed: true,
        })
    }
}

/// Result of a finished run, as consumed by code generators.
#[derive(Debug, Serialize)]
pub struct Extraction {
    pub registry: TypeRegistry,
    pub modules: ModuleMap,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn package(&self, import_path: &str) -> Option<&PackageDescriptor> {
        self.modules.package(import_path)
    }

    /// Struct declarations of a package, in parse order.
    pub fn structs(&self, import_path: &str) -> Vec<&StructDecl> {
        self.package(import_path)
            .map(|package| {
                package
                    .structs
                    .iter()
                    .filter_map(|id| self.registry.named(*id))
                    .filter_map(|entry| entry.body.as_ref().and_then(TypeBody::as_struct))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Interface declarations of a package, in parse order.
    pub fn interfaces(&self, import_path: &str) -> Vec<&InterfaceDecl> {
        self.package(import_path)
            .map(|package| {
                package
                    .interfaces
                    .iter()
                    .filter_map(|id| self.registry.named(*id))
                    .filter_map(|entry| entry.body.as_ref().and_then(TypeBody::as_interface))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn lookup(&self, import_path: &str, name: &str) -> Cow<'_, NamedEntry> {
        self.registry.get(&TypeKey::new(import_path, name))
    }
}
