mod config_ledger;
mod ledger_flow;
mod replay_binary;
