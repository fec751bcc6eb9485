mod insert;
mod observable;
mod selector;
mod statement_log;
mod transaction;
mod update_delete;
