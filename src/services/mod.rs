// Swap lifecycle and inventory services
pub mod inventory;
pub mod swaps;

// Append-only ledger store shared by both
pub mod ledger;

// Read-side rollup
pub mod dashboard;
