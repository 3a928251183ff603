mod callback;
mod command;
mod keyboard;
mod message;

use callback::get_callback_handler;
use command::get_command_handler;
use message::get_message_handler;
use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;

pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(get_command_handler())
        .branch(get_callback_handler())
        .branch(get_message_handler())
}
