// crates/jira-cli/src/commands/mod.rs - Command Handler Modules
//
// One module per command. Handlers return `Flow` so an abort chosen at a
// prompt reaches `main` as an exit status rather than as an error.
//
// MODULE ORGANIZATION:
// - login:   session start and end
// - view:    render an issue with the `view` template
// - edit:    edit loop over an existing issue
// - create:  edit loop over a new issue
// - comment: edit loop over a new comment

pub mod comment;
pub mod create;
pub mod edit;
pub mod login;
pub mod view;
