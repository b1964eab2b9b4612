mod common;

mod integration_block_interactor;
mod unit_models;
mod unit_url_fixer;
