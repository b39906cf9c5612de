use super::model::Transaction;

/// Transactions accepted by the node but not yet sealed into a block.
/// Insertion order is preserved and is the order they are mined in.
#[derive(Debug, Default, Clone)]
pub struct PendingPool {
    txs: Vec<Transaction>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self { txs: Vec::new() }
    }

    pub fn push(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.txs.iter()
    }

    /// Copy of the current contents, used as the payload of a candidate block.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.txs.clone()
    }

    /// Remove the first `count` transactions (the ones a mined block sealed).
    /// Anything submitted after the snapshot was taken stays pending.
    pub fn drain_sealed(&mut self, count: usize) {
        let count = count.min(self.txs.len());
        self.txs.drain(..count);
    }

    /// After a chain swap: drop pending entries the new chain already holds
    /// and put `orphaned` (sealed only in the discarded chain) back at the
    /// front, oldest first. Returns `(requeued, dropped)`.
    pub fn requeue<F>(&mut self, orphaned: Vec<Transaction>, already_sealed: F) -> (usize, usize)
    where
        F: Fn(&Transaction) -> bool,
    {
        let before = self.txs.len();
        self.txs.retain(|tx| !already_sealed(tx));
        let dropped = before - self.txs.len();
        let requeued = orphaned.len();
        self.txs.splice(0..0, orphaned);
        (requeued, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(author: &str) -> Transaction {
        Transaction {
            author: author.into(),
            content: "c".into(),
            timestamp: 1.0,
        }
    }

    #[test]
    fn drain_keeps_later_submissions() {
        let mut pool = PendingPool::new();
        pool.push(tx("a"));
        pool.push(tx("b"));
        let snapshot = pool.snapshot();
        pool.push(tx("c"));

        pool.drain_sealed(snapshot.len());

        let left: Vec<_> = pool.iter().map(|t| t.author.as_str()).collect();
        assert_eq!(left, vec!["c"]);
    }

    #[test]
    fn requeue_puts_orphans_first_and_drops_sealed() {
        let mut pool = PendingPool::new();
        pool.push(tx("sealed-elsewhere"));
        pool.push(tx("still-pending"));

        let counts = pool.requeue(vec![tx("orphan")], |t| t.author == "sealed-elsewhere");

        assert_eq!(counts, (1, 1));
        let left: Vec<_> = pool.iter().map(|t| t.author.as_str()).collect();
        assert_eq!(left, vec!["orphan", "still-pending"]);
    }

    #[test]
    fn drain_past_end_empties_pool() {
        let mut pool = PendingPool::new();
        pool.push(tx("a"));
        pool.drain_sealed(5);
        assert!(pool.is_empty());
    }
}
