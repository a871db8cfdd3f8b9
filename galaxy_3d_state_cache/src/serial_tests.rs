//! Unit tests for serial.rs

use crate::serial::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

// ============================================================================
// RESOURCE SERIAL FACTORY
// ============================================================================

#[test]
fn test_serials_start_at_one_and_increase() {
    let factory = ResourceSerialFactory::new();
    let a = factory.generate_buffer_serial();
    let b = factory.generate_buffer_serial();
    assert_eq!(a.value(), 1);
    assert!(b > a);
    assert!(a.valid());
    assert!(!BufferSerial::INVALID.valid());
}

#[test]
fn test_serial_kinds_have_independent_counters() {
    let factory = ResourceSerialFactory::new();
    assert_eq!(factory.generate_sampler_serial().value(), 1);
    assert_eq!(factory.generate_image_or_buffer_view_serial().value(), 1);
    assert_eq!(factory.generate_sampler_serial().value(), 2);
}

#[test]
fn test_serials_are_never_reused_across_threads() {
    let factory = Arc::new(ResourceSerialFactory::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let factory = Arc::clone(&factory);
            thread::spawn(move || {
                (0..250).map(|_| factory.generate_image_or_buffer_view_serial()).collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for serial in handle.join().unwrap() {
            assert!(serial.valid());
            assert!(seen.insert(serial), "serial {:?} issued twice", serial);
        }
    }
    assert_eq!(seen.len(), 1000);
}

#[test]
fn test_queue_serial_factory() {
    let factory = SerialFactory::default();
    let first = factory.generate();
    let second = factory.generate();
    assert!(first.valid());
    assert!(second > first);
    assert!(!Serial::INVALID.valid());
}

// ============================================================================
// SUBRESOURCE RANGE PACKING
// ============================================================================

#[test]
fn test_subresource_range_fields() {
    let range = ImageSubresourceRange::new(1000, 63, 2047, true).with_srgb_modes(true, false);
    assert_eq!(range.level(), 1000);
    assert_eq!(range.level_count(), 63);
    assert_eq!(range.layer(), 2047);
    assert!(range.single_layer());
    assert!(range.srgb_decode());
    assert!(!range.srgb_override());
}

#[test]
fn test_subresource_serial_identity() {
    let factory = ResourceSerialFactory::new();
    let view = factory.generate_image_or_buffer_view_serial();
    let a = ImageOrBufferViewSubresourceSerial::new(view, ImageSubresourceRange::new(0, 1, 0, false));
    let b = ImageOrBufferViewSubresourceSerial::new(view, ImageSubresourceRange::new(1, 1, 0, false));
    assert!(a.valid());
    assert_ne!(a, b);
    assert!(!ImageOrBufferViewSubresourceSerial::INVALID.valid());
}
