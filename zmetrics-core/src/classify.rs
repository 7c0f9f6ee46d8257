//! Privacy classification of transactions.
//!
//! A transaction is checked against [`TransactionKind::PRECEDENCE`] in order and takes the first
//! kind whose predicate holds. The order is part of the metric definition: historical reports
//! were produced with it, so it must not change even if the predicates ever overlap.

use zmetrics_fetch::jsonrpsee::response::TransactionObject;

/// Privacy class of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// No shielded components.
    Transparent,
    /// Both transparent and shielded components.
    Mixed,
    /// Shielded components only.
    Shielded,
}

/// Which kinds of components a transaction carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Components {
    transparent: bool,
    shielded: bool,
}

impl Components {
    fn of(tx: &TransactionObject) -> Self {
        Self {
            transparent: tx.has_transparent_components(),
            shielded: tx.has_shielded_components(),
        }
    }
}

impl TransactionKind {
    /// Evaluation order of the classification predicates.
    pub const PRECEDENCE: [TransactionKind; 3] = [
        TransactionKind::Transparent,
        TransactionKind::Mixed,
        TransactionKind::Shielded,
    ];

    fn matches(self, components: Components) -> bool {
        match self {
            TransactionKind::Transparent => !components.shielded,
            TransactionKind::Mixed => components.transparent && components.shielded,
            TransactionKind::Shielded => components.shielded && !components.transparent,
        }
    }

    /// Returns the first kind in [`Self::PRECEDENCE`] that `tx` satisfies.
    ///
    /// `None` means no predicate held and the transaction counts towards no class.
    pub fn classify(tx: &TransactionObject) -> Option<TransactionKind> {
        let components = Components::of(tx);
        Self::PRECEDENCE
            .into_iter()
            .find(|kind| kind.matches(components))
    }
}
