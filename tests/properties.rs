use std::sync::Arc;

use chip8_vm::consts::{COLLISION_FLAG, DISPL_BYTES, PIXEL_OFF, PIXEL_ON};
use chip8_vm::{FrameSink, Keypad, Processor, Rom};
use proptest::prelude::*;

fn processor_with(program: &[u8]) -> Processor {
    let rom = Rom::from_bytes(program).unwrap();
    Processor::with_seed(&rom, Arc::new(Keypad::new()), Arc::new(FrameSink::new()), 0).unwrap()
}

fn place(processor: &mut Processor, addr: u16, word: u16) {
    let addr = addr as usize;
    processor.ram.buffer[addr] = (word >> 8) as u8;
    processor.ram.buffer[addr + 1] = word as u8;
}

proptest! {
    #[test]
    fn add_with_carry(a in any::<u8>(), b in any::<u8>()) {
        // ADD V1, V2
        let mut p = processor_with(&[0x81, 0x24]);
        p.registers[1] = a;
        p.registers[2] = b;
        p.step().unwrap();
        prop_assert_eq!(p.registers[1], a.wrapping_add(b));
        prop_assert_eq!(p.registers[0xF], (a as u16 + b as u16 > 255) as u8);
    }

    #[test]
    fn subtract_with_borrow(a in any::<u8>(), b in any::<u8>()) {
        // SUB V1, V2
        let mut p = processor_with(&[0x81, 0x25]);
        p.registers[1] = a;
        p.registers[2] = b;
        p.step().unwrap();
        prop_assert_eq!(p.registers[1], a.wrapping_sub(b));
        prop_assert_eq!(p.registers[0xF], (a >= b) as u8);
    }

    #[test]
    fn reverse_subtract_with_borrow(a in any::<u8>(), b in any::<u8>()) {
        // SUBN V1, V2
        let mut p = processor_with(&[0x81, 0x27]);
        p.registers[1] = a;
        p.registers[2] = b;
        p.step().unwrap();
        prop_assert_eq!(p.registers[1], b.wrapping_sub(a));
        prop_assert_eq!(p.registers[0xF], (b >= a) as u8);
    }

    #[test]
    fn double_draw_restores_display(
        sprite in prop::collection::vec(any::<u8>(), 1..16),
        x in any::<u8>(),
        y in any::<u8>(),
        background in prop::collection::vec(any::<bool>(), DISPL_BYTES),
    ) {
        let n = sprite.len() as u16;
        // DRW V0, V1, n; DRW V0, V1, n
        let mut p = processor_with(&[]);
        place(&mut p, 0x200, 0xD010 | n);
        place(&mut p, 0x202, 0xD010 | n);
        p.ram.buffer[0x300..0x300 + sprite.len()].copy_from_slice(&sprite);
        p.idx_register = 0x300;
        p.registers[0] = x;
        p.registers[1] = y;
        for (cell, &lit) in p.display_buffer.buffer.iter_mut().zip(&background) {
            *cell = if lit { PIXEL_ON } else { PIXEL_OFF };
        }
        let before = p.display_buffer.clone();

        // the second draw collides wherever the first one lit a dark cell
        let mut lit_by_first = false;
        for (row, bits) in sprite.iter().enumerate() {
            for col in 0..8 {
                if bits & (0x80 >> col) != 0 {
                    let px = (x as usize + col) % 64;
                    let py = (y as usize + row) % 32;
                    if before.get(px, py) == PIXEL_OFF {
                        lit_by_first = true;
                    }
                }
            }
        }

        p.step().unwrap();
        p.step().unwrap();
        prop_assert_eq!(&p.display_buffer, &before);
        let expected = if lit_by_first { COLLISION_FLAG } else { 0 };
        prop_assert_eq!(p.registers[0xF], expected);
    }

    #[test]
    fn sprite_wraps_horizontally(y in 0u8..32) {
        // DRW V0, V1, 1 with a full row at x = 60
        let mut p = processor_with(&[0xD0, 0x11]);
        p.ram.buffer[0x300] = 0xFF;
        p.idx_register = 0x300;
        p.registers[0] = 60;
        p.registers[1] = y;
        p.step().unwrap();
        let lit: Vec<usize> = (0..64)
            .filter(|&col| p.display_buffer.get(col, y as usize) == PIXEL_ON)
            .collect();
        prop_assert_eq!(lit, vec![0, 1, 2, 3, 60, 61, 62, 63]);
    }

    #[test]
    fn call_then_return_resumes_after_call_site(
        site in (0x100u16..0x7FF).prop_map(|w| w * 2),
        target in (0x100u16..0x7FF).prop_map(|w| w * 2),
    ) {
        prop_assume!(site != target);
        let mut p = processor_with(&[]);
        place(&mut p, site, 0x2000 | target);
        place(&mut p, target, 0x00EE);
        p.pc = site;
        p.step().unwrap();
        prop_assert_eq!(p.pc, target);
        p.step().unwrap();
        prop_assert_eq!(p.pc, site + 2);
        prop_assert_eq!(p.stack.depth, 0);
    }

    #[test]
    fn bcd_digits_reassemble(value in any::<u8>()) {
        // LD B, V3
        let mut p = processor_with(&[0xF3, 0x33]);
        p.registers[3] = value;
        p.idx_register = 0x400;
        p.step().unwrap();
        let digits = &p.ram.buffer[0x400..0x403];
        prop_assert!(digits.iter().all(|&d| d < 10));
        let reassembled = 100 * digits[0] as u16 + 10 * digits[1] as u16 + digits[2] as u16;
        prop_assert_eq!(reassembled, value as u16);
    }
}
