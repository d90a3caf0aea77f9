// SPDX: CC0-1.0

//! The variable table owned by an equation.

use crate::Number;

/// Name to value table.
///
/// Slots (indices) stay valid for as long as [`VarEnv::generation`] does not
/// change. The generation changes whenever the set of names changes, not
/// when a value is overwritten.
#[derive(Clone, Debug, Default)]
pub struct VarEnv {
    names: Vec<String>,
    values: Vec<Number>,
    generation: u64,
}

impl VarEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|it| it == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Number> {
        self.slot(name).map(|slot| self.values[slot])
    }

    pub fn value_at(&self, slot: usize) -> Option<Number> {
        self.values.get(slot).copied()
    }

    pub fn set_at(&mut self, slot: usize, val: Number) {
        if let Some(dst) = self.values.get_mut(slot) {
            *dst = val;
        }
    }

    /// Sets `name` to `val`, declaring it if needed. Returns the previous
    /// value.
    pub fn insert(&mut self, name: &str, val: Number) -> Option<Number> {
        if let Some(slot) = self.slot(name) {
            Some(core::mem::replace(&mut self.values[slot], val))
        } else {
            self.names.push(name.to_string());
            self.values.push(val);
            self.generation += 1;
            None
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Number> {
        let slot = self.slot(name)?;
        self.names.swap_remove(slot);
        let val = self.values.swap_remove(slot);
        self.generation += 1;
        Some(val)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Entries sorted by name.
    pub fn sorted(&self) -> Vec<(&str, Number)> {
        let mut ret: Vec<_> = self.names().zip(self.values.iter().copied()).collect();
        ret.sort_by(|(a, _), (b, _)| a.cmp(b));
        ret
    }
}

impl<'a> FromIterator<(&'a str, Number)> for VarEnv {
    fn from_iter<I: IntoIterator<Item = (&'a str, Number)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (name, val) in iter {
            env.insert(name, val);
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_tracks_name_set() {
        let mut env = VarEnv::new();
        let g0 = env.generation();

        assert_eq!(env.insert("a", 1.0), None);
        let g1 = env.generation();
        assert_ne!(g0, g1);

        assert_eq!(env.insert("a", 2.0), Some(1.0));
        assert_eq!(env.generation(), g1);
        assert_eq!(env.get("a"), Some(2.0));

        assert_eq!(env.remove("a"), Some(2.0));
        assert_ne!(env.generation(), g1);
        assert_eq!(env.remove("a"), None);
        assert!(env.is_empty());
    }

    #[test]
    fn slots_follow_removal() {
        let mut env: VarEnv = [("a", 1.0), ("b", 2.0), ("c", 3.0)].into_iter().collect();
        env.remove("a");
        let slot = env.slot("c").unwrap();
        assert_eq!(env.value_at(slot), Some(3.0));
        env.set_at(slot, 4.0);
        assert_eq!(env.get("c"), Some(4.0));
        assert_eq!(env.sorted(), [("b", 2.0), ("c", 4.0)]);
    }
}
