//! Modules and the per-run module arena.
//!
//! Script, library and core modules live in an arena owned by the
//! runtime; values refer to them by [`ModuleId`]. Ids carry the arena
//! generation, so an id that outlived its run is rejected instead of
//! silently naming a different module.

use crate::dispatch::FunctionSet;
use crate::errors::ErrorKind;

/// Generational index of a module.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModuleId {
    index: u32,
    generation: u32,
}

impl ModuleId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    /// Built-in operators and commands.
    Core,
    /// A running program.
    Script { name: String },
    /// A library program loaded through the resource loader.
    Library { name: String, locator: String },
}

#[derive(Clone, Debug)]
pub struct Module {
    pub kind: ModuleKind,
    pub functions: FunctionSet,
}

impl Module {
    pub fn new(kind: ModuleKind) -> Self {
        Module {
            kind,
            functions: FunctionSet::new(),
        }
    }

    pub fn is_core(&self) -> bool {
        self.kind == ModuleKind::Core
    }
}

/// Arena of modules, reset between runs.
///
/// Entries kept across a reset (the core module) are re-stamped with the
/// new generation; their ids are handed back by [`ModuleArena::reset`].
#[derive(Debug, Default)]
pub struct ModuleArena {
    slots: Vec<Module>,
    generation: u32,
}

impl ModuleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: Module) -> ModuleId {
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(module);
        ModuleId {
            index,
            generation: self.generation,
        }
    }

    fn check(&self, id: ModuleId) -> Result<usize, ErrorKind> {
        if id.generation == self.generation && id.index() < self.slots.len() {
            Ok(id.index())
        } else {
            Err(ErrorKind::StaleModule)
        }
    }

    pub fn get(&self, id: ModuleId) -> Result<&Module, ErrorKind> {
        let index = self.check(id)?;
        Ok(&self.slots[index])
    }

    pub fn get_mut(&mut self, id: ModuleId) -> Result<&mut Module, ErrorKind> {
        let index = self.check(id)?;
        Ok(&mut self.slots[index])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Start a new generation keeping only `keep`, which becomes index 0.
    ///
    /// Every previously issued id becomes stale.
    pub fn reset(&mut self, keep: ModuleId) -> Result<ModuleId, ErrorKind> {
        let index = self.check(keep)?;
        let kept = self.slots.swap_remove(index);
        self.slots.clear();
        self.generation = self.generation.wrapping_add(1);
        Ok(self.insert(kept))
    }
}
