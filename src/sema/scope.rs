//! Scope manager
//!
//! Tracks lexical scopes while a program is resolved:
//! - [`ScopeManager`]: a stack of local frames over a global table
//! - [`Variable`]: a declared name with its type and storage
//!
//! Each `{ ... }` block, function body and loop body pushes a frame. Lookups
//! walk the frames innermost first and fall back to the globals. Struct tags
//! live in a parallel namespace with the same scoping rules.

use super::errors::NameError;
use super::types::{CType, StructLayout};
use crate::parser::ast::SourceLocation;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Where a variable's bytes live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Byte offset into the globals block
    Global { offset: usize },
    /// Byte offset into the enclosing function's frame
    Local { offset: usize },
}

/// A declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: CType,
    pub storage: Storage,
    /// 0 for globals, 1 for a function's outermost scope, +1 per nested block
    pub depth: usize,
}

#[derive(Debug, Default)]
struct ScopeFrame {
    vars: FxHashMap<String, Variable>,
    tags: FxHashMap<String, Rc<StructLayout>>,
}

/// Stack of lexical scopes over the global namespace
#[derive(Debug, Default)]
pub struct ScopeManager {
    globals: ScopeFrame,
    frames: Vec<ScopeFrame>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new block scope
    pub fn enter_scope(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    /// Exit the current block scope; its names stop resolving
    pub fn exit_scope(&mut self) {
        self.frames.pop();
    }

    /// Current nesting depth (0 at file scope)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn innermost_mut(&mut self) -> &mut ScopeFrame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => &mut self.globals,
        }
    }

    /// Declare a variable in the innermost scope.
    ///
    /// Shadowing an outer or global name is allowed; redeclaring a name in the
    /// same scope is a [`NameError`].
    pub fn declare(
        &mut self,
        name: &str,
        ty: CType,
        storage: Storage,
        location: SourceLocation,
    ) -> Result<Variable, NameError> {
        let depth = self.depth();
        let frame = self.innermost_mut();

        if frame.vars.contains_key(name) {
            return Err(NameError::redeclared("variable", name, location));
        }

        let var = Variable {
            name: name.to_string(),
            ty,
            storage,
            depth,
        };
        frame.vars.insert(name.to_string(), var.clone());
        Ok(var)
    }

    /// Resolve a name, innermost scope first, then globals
    pub fn resolve(&self, name: &str, location: SourceLocation) -> Result<&Variable, NameError> {
        self.frames
            .iter()
            .rev()
            .chain(std::iter::once(&self.globals))
            .find_map(|frame| frame.vars.get(name))
            .ok_or_else(|| NameError::undefined("variable", name, location))
    }

    /// True if `name` is declared in the innermost scope
    pub fn declared_here(&self, name: &str) -> bool {
        match self.frames.last() {
            Some(frame) => frame.vars.contains_key(name),
            None => self.globals.vars.contains_key(name),
        }
    }

    /// Define a struct tag in the innermost scope
    pub fn declare_tag(
        &mut self,
        tag: &str,
        layout: Rc<StructLayout>,
        location: SourceLocation,
    ) -> Result<(), NameError> {
        let frame = self.innermost_mut();
        if frame.tags.contains_key(tag) {
            return Err(NameError::redeclared("struct", tag, location));
        }
        frame.tags.insert(tag.to_string(), layout);
        Ok(())
    }

    /// Resolve a struct tag, innermost scope first
    pub fn resolve_tag(
        &self,
        tag: &str,
        location: SourceLocation,
    ) -> Result<Rc<StructLayout>, NameError> {
        self.frames
            .iter()
            .rev()
            .chain(std::iter::once(&self.globals))
            .find_map(|frame| frame.tags.get(tag))
            .cloned()
            .ok_or_else(|| NameError::undefined("struct", tag, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_shadowing_and_exit() {
        let mut scopes = ScopeManager::new();
        scopes
            .declare("x", CType::Int, Storage::Global { offset: 0 }, loc())
            .unwrap();

        scopes.enter_scope();
        scopes
            .declare("x", CType::Char, Storage::Local { offset: 0 }, loc())
            .unwrap();
        assert_eq!(scopes.resolve("x", loc()).unwrap().ty, CType::Char);
        assert_eq!(scopes.resolve("x", loc()).unwrap().depth, 1);

        scopes.enter_scope();
        scopes
            .declare("y", CType::Int, Storage::Local { offset: 4 }, loc())
            .unwrap();
        scopes.exit_scope();

        assert!(scopes.resolve("y", loc()).is_err());
        assert_eq!(scopes.resolve("x", loc()).unwrap().ty, CType::Char);

        scopes.exit_scope();
        let global = scopes.resolve("x", loc()).unwrap();
        assert_eq!(global.ty, CType::Int);
        assert_eq!(global.storage, Storage::Global { offset: 0 });
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        let mut scopes = ScopeManager::new();
        scopes.enter_scope();
        scopes
            .declare("a", CType::Int, Storage::Local { offset: 0 }, loc())
            .unwrap();
        let err = scopes
            .declare("a", CType::Int, Storage::Local { offset: 4 }, SourceLocation::new(2, 3))
            .unwrap_err();
        assert_eq!(err.name, "a");
        assert_eq!(err.location, SourceLocation::new(2, 3));
    }

    #[test]
    fn test_unresolved_name() {
        let scopes = ScopeManager::new();
        let err = scopes.resolve("missing", loc()).unwrap_err();
        assert!(err.message.contains("missing"));
    }

    #[test]
    fn test_tags_follow_block_scoping() {
        let mut scopes = ScopeManager::new();
        let layout = Rc::new(StructLayout::compute(0, Some("P".into()), vec![]));

        scopes.enter_scope();
        scopes.declare_tag("P", layout.clone(), loc()).unwrap();
        assert!(scopes.declare_tag("P", layout, loc()).is_err());
        assert!(scopes.resolve_tag("P", loc()).is_ok());
        scopes.exit_scope();

        assert!(scopes.resolve_tag("P", loc()).is_err());
    }
}
