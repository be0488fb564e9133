//! kiwi client binary - drive the automation service from the command line

use kiwi::{ClientConfig, Key, KiwiError, Point, Response, RgbOffset, ScreenClient};
use log::error;
use std::env;
use std::fmt::Debug;
use std::str::FromStr;

/// Drop `--port <n>` / `--port=<n>`; ClientConfig reads those
fn filter_args(args: &[String]) -> Vec<String> {
    let mut filtered = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--port" {
            iter.next();
        } else if !arg.starts_with("--port=") {
            filtered.push(arg.clone());
        }
    }
    filtered
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> kiwi::Result<()> {
    let raw: Vec<String> = env::args().collect();
    let config = ClientConfig::from_args(raw.iter().skip(1))?;
    let args = filter_args(&raw);

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let command = args[1].as_str();
    if !is_known_command(command) {
        print_usage();
        return Ok(());
    }

    let mut client = ScreenClient::new(config)?;
    let result = run_command(&mut client, command, &args);
    client.close();
    result
}

fn is_known_command(command: &str) -> bool {
    matches!(
        command,
        "ping"
            | "location"
            | "click-left"
            | "click-right"
            | "press-left"
            | "press-right"
            | "release-left"
            | "release-right"
            | "move"
            | "move-rel"
            | "scroll-v"
            | "scroll-h"
            | "key"
            | "press-key"
            | "release-key"
            | "text"
            | "copy"
            | "paste"
            | "cut"
            | "select-all"
            | "find-image"
            | "find-images"
            | "find-colors"
            | "ocr"
            | "save-frame"
    )
}

fn run_command(client: &mut ScreenClient, command: &str, args: &[String]) -> kiwi::Result<()> {
    match command {
        "ping" => {
            if client.health_check()? {
                println!("Service is alive");
            } else {
                println!("No healthy response from service");
            }
        }

        "location" => match client.get_mouse_location()? {
            Some(Response { data: Some(point), .. }) => println!("{} {}", point.x, point.y),
            other => report(other),
        },

        "click-left" => report(client.click_left()?),
        "click-right" => report(client.click_right()?),
        "press-left" => report(client.press_left()?),
        "press-right" => report(client.press_right()?),
        "release-left" => report(client.release_left()?),
        "release-right" => report(client.release_right()?),

        "move" | "move-rel" => {
            if args.len() < 4 {
                println!("Usage: kiwi-client {} <x> <y>", command);
                return Ok(());
            }
            let point = Point::new(parse(&args[2], "x")?, parse(&args[3], "y")?);
            if command == "move" {
                report(client.move_absolute(point)?);
            } else {
                report(client.move_relative(point)?);
            }
        }

        "scroll-v" | "scroll-h" => {
            if args.len() < 3 {
                println!("Usage: kiwi-client {} <length>", command);
                return Ok(());
            }
            let length: i32 = parse(&args[2], "length")?;
            if command == "scroll-v" {
                report(client.scroll_vertical(length)?);
            } else {
                report(client.scroll_horizontal(length)?);
            }
        }

        "key" | "press-key" | "release-key" => {
            if args.len() < 3 {
                println!("Usage: kiwi-client {} <key>", command);
                return Ok(());
            }
            let key: Key = args[2].parse()?;
            let response = match command {
                "press-key" => client.press_key(key)?,
                "release-key" => client.release_key(key)?,
                _ => client.click_key(key)?,
            };
            report(response);
        }

        "text" => {
            if args.len() < 3 {
                println!("Usage: kiwi-client text <text>");
                return Ok(());
            }
            report(client.input_text(&args[2])?);
        }

        "copy" => client.input_copy()?,
        "paste" => client.input_paste()?,
        "cut" => client.input_cut()?,
        "select-all" => client.input_select_all()?,

        "find-image" | "find-images" => {
            if args.len() < 8 {
                println!(
                    "Usage: kiwi-client {} <subpath> <x1> <y1> <x2> <y2> <threshold>",
                    command
                );
                return Ok(());
            }
            let (start, end) = parse_region(&args[3..7])?;
            let threshold: f64 = parse(&args[7], "threshold")?;
            if command == "find-image" {
                report(client.find_image(&args[2], start, end, threshold)?);
            } else {
                report(client.find_images(&args[2], start, end, threshold)?);
            }
        }

        "find-colors" => {
            if args.len() < 7 {
                println!(
                    "Usage: kiwi-client find-colors <x1> <y1> <x2> <y2> <hex>[,<hex>...] [r g b]"
                );
                return Ok(());
            }
            let (start, end) = parse_region(&args[2..6])?;
            let colors: Vec<&str> = args[6].split(',').collect();
            let offset = if args.len() >= 10 {
                RgbOffset::new(
                    parse(&args[7], "r")?,
                    parse(&args[8], "g")?,
                    parse(&args[9], "b")?,
                )
            } else {
                RgbOffset::default()
            };
            report(client.find_colors(&colors, start, end, offset)?);
        }

        "ocr" => {
            if args.len() < 6 {
                println!("Usage: kiwi-client ocr <x1> <y1> <x2> <y2>");
                return Ok(());
            }
            let (start, end) = parse_region(&args[2..6])?;
            report(client.recognize_text(start, end)?);
        }

        "save-frame" => {
            if args.len() < 3 {
                println!("Usage: kiwi-client save-frame <path>");
                return Ok(());
            }
            report(client.save_frame(&args[2])?);
        }

        _ => print_usage(),
    }

    Ok(())
}

fn report<T: Debug>(response: Option<Response<T>>) {
    match response {
        Some(response) if response.is_success() => match response.data {
            Some(data) => println!("{:?}", data),
            None => println!("OK"),
        },
        Some(response) => println!(
            "Error: {}",
            response.message.as_deref().unwrap_or("unknown error")
        ),
        None => println!("No valid response from service"),
    }
}

fn parse<T: FromStr>(s: &str, what: &str) -> kiwi::Result<T> {
    s.parse()
        .map_err(|_| KiwiError::ConfigError(format!("Invalid {}: {}", what, s)))
}

fn parse_region(args: &[String]) -> kiwi::Result<(Point, Point)> {
    let start = Point::new(parse(&args[0], "x1")?, parse(&args[1], "y1")?);
    let end = Point::new(parse(&args[2], "x2")?, parse(&args[3], "y2")?);
    Ok((start, end))
}

fn print_usage() {
    println!("kiwi client - screen automation from the command line");
    println!();
    println!("Usage: kiwi-client [--port <port>] <command> [args...]");
    println!();
    println!("Commands:");
    println!("  ping                                    Check the service is answering");
    println!("  location                                Print mouse location");
    println!("  click-left | click-right                Click a mouse button");
    println!("  press-left | press-right                Press a mouse button");
    println!("  release-left | release-right            Release a mouse button");
    println!("  move <x> <y>                            Move mouse to absolute position");
    println!("  move-rel <dx> <dy>                      Move mouse by offset");
    println!("  scroll-v <length> | scroll-h <length>   Scroll");
    println!("  key | press-key | release-key <key>     Click, press or release a key");
    println!("  text <text>                             Type text");
    println!("  copy | paste | cut | select-all         Clipboard shortcuts");
    println!("  find-image <subpath> <x1> <y1> <x2> <y2> <threshold>");
    println!("  find-images <subpath> <x1> <y1> <x2> <y2> <threshold>");
    println!("  find-colors <x1> <y1> <x2> <y2> <hex>[,<hex>...] [r g b]");
    println!("  ocr <x1> <y1> <x2> <y2>                 Recognize text in a region");
    println!("  save-frame <path>                       Save the current frame");
    println!();
    println!("Default service address: ws://127.0.0.1:{}/", kiwi::DEFAULT_PORT);
    println!();
    println!("Keys use service names (Control, Meta, Return, LeftArrow, F1, ...);");
    println!("single letters and digits are accepted as shorthand.");
}
