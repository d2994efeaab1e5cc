//! Trades, positions and the trading record.
//!
//! A [`TradingRecord`] tracks one position at a time: `enter` opens a position
//! when flat, `exit` closes the open one. Closed positions are retained in
//! entry order for reporting.

/// Direction of the entry trade of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn complement(self) -> TradeType {
        match self {
            TradeType::Buy => TradeType::Sell,
            TradeType::Sell => TradeType::Buy,
        }
    }
}

/// One fill at a bar index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub trade_type: TradeType,
    pub index: usize,
    pub price: f64,
    pub amount: f64,
}

/// An entry trade and its eventual exit.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry: Trade,
    pub exit: Option<Trade>,
}

impl Position {
    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    /// Realized profit of a closed position, `None` while open.
    pub fn profit(&self) -> Option<f64> {
        let exit = self.exit.as_ref()?;
        let delta = match self.entry.trade_type {
            TradeType::Buy => exit.price - self.entry.price,
            TradeType::Sell => self.entry.price - exit.price,
        };
        Some(delta * self.entry.amount)
    }

    /// Realized profit as a percentage of the entry value, `None` while open
    /// or when the entry value is zero.
    pub fn profit_pct(&self) -> Option<f64> {
        let profit = self.profit()?;
        let entry_value = self.entry.price * self.entry.amount;
        if entry_value == 0.0 {
            return None;
        }
        Some(profit / entry_value * 100.0)
    }

    /// Exit-to-entry price ratio of a closed position (inverted for shorts).
    pub fn return_ratio(&self) -> Option<f64> {
        let exit = self.exit.as_ref()?;
        if self.entry.price == 0.0 || exit.price == 0.0 {
            return None;
        }
        Some(match self.entry.trade_type {
            TradeType::Buy => exit.price / self.entry.price,
            TradeType::Sell => self.entry.price / exit.price,
        })
    }
}

/// Chronological record of the positions taken by one strategy run.
#[derive(Debug, Clone)]
pub struct TradingRecord {
    starting_type: TradeType,
    closed: Vec<Position>,
    current: Option<Position>,
}

impl TradingRecord {
    pub fn new(starting_type: TradeType) -> Self {
        TradingRecord {
            starting_type,
            closed: Vec::new(),
            current: None,
        }
    }

    pub fn starting_type(&self) -> TradeType {
        self.starting_type
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Open a position. Returns false when one is already open.
    pub fn enter(&mut self, index: usize, price: f64, amount: f64) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(Position {
            entry: Trade {
                trade_type: self.starting_type,
                index,
                price,
                amount,
            },
            exit: None,
        });
        true
    }

    /// Close the open position. Returns false when flat.
    pub fn exit(&mut self, index: usize, price: f64, amount: f64) -> bool {
        match self.current.take() {
            Some(mut position) => {
                position.exit = Some(Trade {
                    trade_type: self.starting_type.complement(),
                    index,
                    price,
                    amount,
                });
                self.closed.push(position);
                true
            }
            None => false,
        }
    }

    /// Entry trade of the open position, if any.
    pub fn current_entry(&self) -> Option<&Trade> {
        self.current.as_ref().map(|p| &p.entry)
    }

    /// Most recent entry trade, open or closed.
    pub fn last_entry(&self) -> Option<&Trade> {
        self.current_entry()
            .or_else(|| self.closed.last().map(|p| &p.entry))
    }

    pub fn last_exit(&self) -> Option<&Trade> {
        self.closed.last().and_then(|p| p.exit.as_ref())
    }

    /// Closed positions in entry order.
    pub fn positions(&self) -> &[Position] {
        &self.closed
    }

    pub fn position_count(&self) -> usize {
        self.closed.len()
    }
}
