mod history;

pub use history::HistoryStack;
