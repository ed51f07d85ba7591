//! Guard predicates for controlling transitions.
//!
//! Guards are boolean functions over an explicit context value. The engine
//! evaluates them every time a transition is listed or executed, so a guard
//! may observe context that changes between calls.

use std::fmt;
use std::marker::PhantomData;

/// Predicate that determines if a transition may execute.
///
/// The context type `C` is whatever the application threads through its
/// machines (a game table, a document, `()`). Guards only read it; the engine
/// treats them as side-effect free.
///
/// # Example
///
/// ```rust
/// use matryoshka::core::Guard;
///
/// struct Table {
///     players: Vec<String>,
/// }
///
/// let enough_players = Guard::new(|table: &Table| table.players.len() >= 2);
///
/// let mut table = Table { players: vec!["ann".into(), "bo".into()] };
/// assert!(enough_players.check(&table));
///
/// table.players.pop();
/// assert!(!enough_players.check(&table));
/// ```
pub struct Guard<C> {
    predicate: Box<dyn Fn(&C) -> bool + Send + Sync>,
    _phantom: PhantomData<fn(&C)>,
}

impl<C> Guard<C> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate should be deterministic for a given context and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Check if the guard allows the transition under this context.
    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Lobby {
        players: HashSet<&'static str>,
        open: bool,
    }

    #[test]
    fn guard_reads_context() {
        let guard = Guard::new(|lobby: &Lobby| lobby.open);

        let mut lobby = Lobby::default();
        assert!(!guard.check(&lobby));

        lobby.open = true;
        assert!(guard.check(&lobby));
    }

    #[test]
    fn guard_sees_shrinking_context() {
        let guard = Guard::new(|lobby: &Lobby| lobby.players.len() > 1);

        let mut lobby = Lobby::default();
        lobby.players.insert("ann");
        lobby.players.insert("bo");
        assert!(guard.check(&lobby));

        lobby.players.remove("bo");
        assert!(!guard.check(&lobby));
    }

    #[test]
    fn guard_is_deterministic() {
        let lobby = Lobby {
            open: true,
            ..Lobby::default()
        };
        let guard = Guard::new(|lobby: &Lobby| lobby.open && lobby.players.is_empty());

        let result1 = guard.check(&lobby);
        let result2 = guard.check(&lobby);

        assert_eq!(result1, result2);
    }

    #[test]
    fn guard_over_unit_context() {
        let always = Guard::new(|_: &()| true);
        let never = Guard::new(|_: &()| false);

        assert!(always.check(&()));
        assert!(!never.check(&()));
    }
}
