//! Type hierarchy used by overload resolution and coercion.

use bushel_ir::builtin_terms::Types;
use bushel_ir::TermId;
use rustc_hash::FxHashMap;

/// Maps each type to its supertype; `item` is the implicit root.
#[derive(Clone, Debug)]
pub struct TypeTree {
    supertypes: FxHashMap<TermId, TermId>,
}

/// Guards against cycles introduced by imported terminology.
const MAX_DEPTH: usize = 64;

impl TypeTree {
    /// The built-in hierarchy: `integer ⊂ real ⊂ number`, the specialised
    /// specifiers under `specifier`, everything else directly under `item`.
    pub fn builtin() -> Self {
        let mut tree = TypeTree {
            supertypes: FxHashMap::default(),
        };
        tree.add(Types::Integer.id(), Types::Real.id());
        tree.add(Types::Real.id(), Types::Number.id());
        tree.add(Types::TestSpecifier.id(), Types::Specifier.id());
        tree.add(Types::InsertionSpecifier.id(), Types::Specifier.id());
        tree
    }

    pub fn add(&mut self, ty: TermId, supertype: TermId) {
        self.supertypes.insert(ty, supertype);
    }

    pub fn supertype(&self, ty: &TermId) -> Option<&TermId> {
        self.supertypes.get(ty)
    }

    /// Whether `ty` is `ancestor` or one of its subtypes.
    pub fn is_a(&self, ty: &TermId, ancestor: &TermId) -> bool {
        if ty == ancestor || Types::Item.is(ancestor) {
            return true;
        }
        let mut current = ty;
        for _ in 0..MAX_DEPTH {
            match self.supertypes.get(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}

impl Default for TypeTree {
    fn default() -> Self {
        Self::builtin()
    }
}
