//! Aggregate traits for state machines with pure decision logic.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version, +1 per applied event.
    fn version(&self) -> u64;
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// Aggregates must not perform IO. Orchestrators call collaborators, then feed
/// the outcome back in as a command.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    ///
    /// This must not mutate state.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Handle a command and apply every resulting event.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
