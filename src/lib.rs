/// Fixed-width account identifiers.
pub mod address;

/// Balances, allowances and total supply of a single fungible token.
/// State is modified using events, which are created by handling commands,
/// so an operation either applies fully or leaves the ledger untouched.
pub mod ledger;

/// Conversion between token quantities and base units.
pub mod units;

/// Raw operation records and the ledger commands parsed from them.
pub mod command;

/// Transaction processor interface, mint authorization, plus "in memory" and
/// thread-shared implementations.
pub mod processor;

/// CSV operation-log service used by the binary and the integration tests.
pub mod bin_utils;
