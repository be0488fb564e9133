//! Demo: print the mouse location once a second
//!
//! Run with `cargo run --example location -- --port 9927`.

use kiwi::system::sleep_ms;
use kiwi::{ClientConfig, ScreenClient};
use log::warn;

fn main() -> kiwi::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ClientConfig::from_args(std::env::args().skip(1))?;
    println!("=== kiwi demo - mouse location ({}) ===\n", config.url());

    let mut client = ScreenClient::new(config)?;

    for _ in 0..10 {
        match client.get_mouse_location()? {
            Some(response) => match response.data {
                Some(point) => println!("location: ({}, {})", point.x, point.y),
                None => println!("location unavailable: {:?}", response.message),
            },
            None => warn!("Service sent an invalid reply"),
        }
        sleep_ms(1000);
    }

    client.close();
    println!("\n=== Demo Complete ===");
    Ok(())
}
