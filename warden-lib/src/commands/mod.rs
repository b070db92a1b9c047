pub mod cat;
pub mod checks;
pub mod help;
pub mod kick;
pub mod lookup;
pub mod owner;
pub mod ping;
pub mod prefix;
pub mod purge;
pub mod register;
pub mod status;

use crate::data::State;
use color_eyre::eyre::Error;

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<State, Error>> {
    vec![
        cat::cat(),
        help::help(),
        kick::kick(),
        lookup::lookup(),
        owner::maintenance(),
        owner::noprefix(),
        ping::ping(),
        prefix::prefix(),
        purge::purge(),
        register::register(),
        status::status(),
    ]
}
