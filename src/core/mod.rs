/// Role-based capability checks
pub mod access;
/// Shared database, clock and lock handles
pub mod context;
/// Paid-ticket checks that block structural changes
pub mod guard;
/// Hall catalog operations
pub mod hall;
/// Free-seat accounting per session and show date
pub mod ledger;
/// In-process keyed locks
pub mod locks;
/// Movie catalog operations
pub mod movie;
/// Ticket purchases and purchase history
pub mod purchase;
/// Overlap rules for sessions in one hall
pub mod schedule;
/// Session scheduling operations
pub mod session;
/// Accounts, token lookup and wallet debits
pub mod user;
