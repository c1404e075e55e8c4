use std::collections::VecDeque;

use tokio::sync::Mutex;

use super::prompt::Exchange;

/// Rolling window of the most recent exchanges of one pipeline.
pub struct ConversationMemory {
    capacity: usize,
    exchanges: Mutex<VecDeque<Exchange>>,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            exchanges: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Oldest first.
    pub async fn recent(&self) -> Vec<Exchange> {
        self.exchanges.lock().await.iter().cloned().collect()
    }

    pub async fn record(&self, exchange: Exchange) {
        if self.capacity == 0 {
            return;
        }
        let mut exchanges = self.exchanges.lock().await;
        while exchanges.len() >= self.capacity {
            exchanges.pop_front();
        }
        exchanges.push_back(exchange);
    }

    pub async fn len(&self) -> usize {
        self.exchanges.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> Exchange {
        Exchange {
            query: format!("q{}", n),
            answer: format!("a{}", n),
        }
    }

    #[tokio::test]
    async fn keeps_only_latest_exchanges() {
        let memory = ConversationMemory::new(2);
        for n in 0..3 {
            memory.record(exchange(n)).await;
        }

        let recent = memory.recent().await;
        assert_eq!(recent, vec![exchange(1), exchange(2)]);
    }

    #[tokio::test]
    async fn zero_capacity_remembers_nothing() {
        let memory = ConversationMemory::new(0);
        memory.record(exchange(1)).await;
        assert_eq!(memory.len().await, 0);
    }
}
