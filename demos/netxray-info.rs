use netxray_parser::*;
use std::env;
use std::error::Error;
use std::fs::File;

fn main() {
    for arg in env::args().skip(1) {
        if let Err(e) = print_netxray_info(&arg) {
            eprintln!("{}: {}", arg, e);
        }
    }
}

fn print_netxray_info(arg: &str) -> Result<(), Box<dyn Error>> {
    println!("Name: {}", arg);

    let file = File::open(arg)?;
    let file_size = file.metadata()?.len();
    println!("\tfile size: {}", file_size);

    let mut reader = match NetxrayReader::new(64 * 1024, file) {
        Ok(reader) => reader,
        Err(e) if e.is_format_mismatch() => return Err("not a NetXRay file".into()),
        Err(e) => return Err(e.into()),
    };

    let info = *reader.info();
    println!("\tversion: {:?}", info.version);
    println!("\tnetwork type: {} (capture type {})", info.network, info.captype);
    println!("\tencapsulation: {:?}", info.encapsulation);
    if let Some(isdn_type) = info.isdn_type {
        println!("\tISDN line: {:?}", isdn_type);
    }
    println!(
        "\tticks per second: {} ({:?} precision)",
        info.ticks_per_sec, info.ts_precision
    );
    println!("\tstart time: {}", info.start_time);
    println!("\tline speed: {} bits/s", info.linespeed);
    println!("\tFCS present: {}", info.fcs_valid);
    if info.is_circular() {
        println!(
            "\tcircular capture: start 0x{:x}, end 0x{:x}",
            info.start_offset, info.end_offset
        );
    }

    // count packets in file
    let mut num_packets = 0;
    let mut num_bytes = 0u64;
    let mut first_last = None;

    loop {
        match reader.next_packet() {
            Ok((_offset, packet)) => {
                num_packets += 1;
                num_bytes += u64::from(packet.caplen);
                let ts = packet.ts_f64();
                first_last = match first_last {
                    None => Some((ts, ts)),
                    Some((first, _)) => Some((first, ts)),
                };
            }
            Err(NetxrayError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("\tnum_packets: {} (header says {})", num_packets, info.nframes);
    println!("\tcaptured bytes: {}", num_bytes);
    if let Some((first, last)) = first_last {
        println!("\tduration: {:.6} s", last - first);
    }

    Ok(())
}
