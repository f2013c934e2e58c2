//! Variable table.
//!
//! Variables are appended in declaration order: the n-th declared variable
//! sits at level n. Besides the id/level mapping the table keeps per-variable
//! scratch state (a small mark and a substitution edge) that recursive
//! operators set up before a traversal and clear when they finish.

use std::collections::HashMap;

use crate::error::{BddError, BddResult};
use crate::reference::Ref;
use crate::types::{Level, VarId};

#[derive(Debug, Clone)]
pub struct Variable {
    id: VarId,
    level: Level,
    pub(crate) mark: u8,
    pub(crate) subst: Option<Ref>,
}

impl Variable {
    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

#[derive(Debug, Default)]
pub struct VarTable {
    vars: Vec<Variable>,
    levels: HashMap<VarId, Level>,
    /// Deepest level touched by the current marking.
    pub(crate) last_level: Option<Level>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Declares `id` (if new) and returns its level.
    pub fn declare(&mut self, id: VarId) -> BddResult<Level> {
        if let Some(&level) = self.levels.get(&id) {
            return Ok(level);
        }
        if self.vars.len() >= Level::TERMINAL.index() as usize {
            return Err(BddError::Overflow);
        }
        self.vars.try_reserve(1).map_err(|_| BddError::Overflow)?;
        self.levels.try_reserve(1).map_err(|_| BddError::Overflow)?;

        let level = Level::new(self.vars.len() as u32);
        self.vars.push(Variable {
            id,
            level,
            mark: 0,
            subst: None,
        });
        self.levels.insert(id, level);
        Ok(level)
    }

    /// Level of `id`, if declared.
    pub fn find(&self, id: VarId) -> Option<Level> {
        self.levels.get(&id).copied()
    }

    /// Level of a declared variable.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never declared.
    pub fn level_of(&self, id: VarId) -> Level {
        match self.find(id) {
            Some(level) => level,
            None => panic!("Variable {} is not declared", id),
        }
    }

    /// Variable at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` is out of range.
    pub fn get(&self, level: Level) -> &Variable {
        match self.vars.get(level.index() as usize) {
            Some(var) => var,
            None => panic!("Level {} is out of range (have {} variables)", level, self.vars.len()),
        }
    }

    pub(crate) fn get_mut(&mut self, level: Level) -> &mut Variable {
        let n = self.vars.len();
        match self.vars.get_mut(level.index() as usize) {
            Some(var) => var,
            None => panic!("Level {} is out of range (have {} variables)", level, n),
        }
    }

    pub fn id_of(&self, level: Level) -> VarId {
        self.get(level).id
    }

    /// Variable ids in level order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> + '_ {
        self.vars.iter().map(|v| v.id)
    }

    pub(crate) fn mark(&self, level: Level) -> u8 {
        self.get(level).mark
    }

    /// Sets mark bits on `level` and extends `last_level`.
    pub(crate) fn set_mark(&mut self, level: Level, bits: u8) {
        self.get_mut(level).mark |= bits;
        if self.last_level.map_or(true, |last| last < level) {
            self.last_level = Some(level);
        }
    }

    /// Whether `level` lies below the deepest marked level.
    pub(crate) fn beyond_marks(&self, level: Level) -> bool {
        self.last_level.map_or(true, |last| level > last)
    }

    /// Levels with a non-zero mark, top to bottom.
    pub(crate) fn marked(&self) -> Vec<(Level, u8)> {
        self.vars.iter().filter(|v| v.mark != 0).map(|v| (v.level, v.mark)).collect()
    }

    pub(crate) fn clear_marks(&mut self) {
        for var in &mut self.vars {
            var.mark = 0;
            var.subst = None;
        }
        self.last_level = None;
    }
}
