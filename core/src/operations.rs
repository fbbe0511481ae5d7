use crate::constants::{DISPLAY_HEIGHT, DISPLAY_SIZE, DISPLAY_WIDTH, OPCODE_SIZE, STACK_SIZE};
use crate::cpu::{Cpu, Flow};
use crate::error::Fault;
use crate::font::FONT_CHARACTER_SIZE;
use crate::opcode::Opcode;

type Outcome = Result<Flow, Fault>;

/// pc += 2 when `condition` holds
fn skip_if(cpu: &mut Cpu, condition: bool) -> Outcome {
    if condition {
        cpu.state.pc = cpu.state.pc.wrapping_add(OPCODE_SIZE);
    }
    Ok(Flow::Continue)
}

/// Address of the instruction being executed; the pc has already moved past it.
fn current_pc(cpu: &Cpu) -> u16 {
    cpu.state.pc.wrapping_sub(OPCODE_SIZE)
}

/// clear
pub fn clr(cpu: &mut Cpu, _op: Opcode) -> Outcome {
    cpu.shared
        .with_frame_buffer(|frame| *frame = [0; DISPLAY_SIZE]);
    Ok(Flow::Continue)
}

/// PC = STACK.pop()
pub fn rts(cpu: &mut Cpu, _op: Opcode) -> Outcome {
    if cpu.state.sp == 0 {
        return Err(Fault::StackUnderflow {
            pc: current_pc(cpu),
        });
    }
    cpu.state.sp -= 1;
    cpu.state.pc = cpu.state.stack[usize::from(cpu.state.sp)];
    Ok(Flow::Continue)
}

/// PC = addr
pub fn jump(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.pc = op.addr();
    Ok(Flow::Continue)
}

/// STACK.push(PC); PC = addr
pub fn call(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let sp = usize::from(cpu.state.sp);
    if sp >= STACK_SIZE {
        return Err(Fault::StackOverflow {
            pc: current_pc(cpu),
        });
    }
    cpu.state.stack[sp] = cpu.state.pc;
    cpu.state.sp += 1;
    cpu.state.pc = op.addr();
    Ok(Flow::Continue)
}

/// if Vx == kk then pc += 2
pub fn ske(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let condition = cpu.state.v[op.x()] == op.kk();
    skip_if(cpu, condition)
}

/// if Vx != kk then pc += 2
pub fn skne(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let condition = cpu.state.v[op.x()] != op.kk();
    skip_if(cpu, condition)
}

/// if Vx == Vy then pc += 2
pub fn skre(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let condition = cpu.state.v[op.x()] == cpu.state.v[op.y()];
    skip_if(cpu, condition)
}

/// Vx = kk
pub fn load(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] = op.kk();
    Ok(Flow::Continue)
}

/// Vx += kk
/// Wraps without touching VF
pub fn add(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] = cpu.state.v[op.x()].wrapping_add(op.kk());
    Ok(Flow::Continue)
}

/// Vx = Vy
pub fn mv(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] = cpu.state.v[op.y()];
    Ok(Flow::Continue)
}

/// Vx |= Vy
pub fn or(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] |= cpu.state.v[op.y()];
    Ok(Flow::Continue)
}

/// Vx &= Vy
pub fn and(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] &= cpu.state.v[op.y()];
    Ok(Flow::Continue)
}

/// Vx ^= Vy
pub fn xor(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] ^= cpu.state.v[op.y()];
    Ok(Flow::Continue)
}

/// Writes an ALU result and then its flag, so VF ends up holding the flag even when x is F.
fn set_with_flag(cpu: &mut Cpu, x: usize, result: u8, flag: bool) -> Outcome {
    cpu.state.v[x] = result;
    cpu.state.v[0xF] = u8::from(flag);
    Ok(Flow::Continue)
}

/// Vx += Vy; VF = overflow
pub fn addr(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let (res, over) = cpu.state.v[op.x()].overflowing_add(cpu.state.v[op.y()]);
    set_with_flag(cpu, op.x(), res, over)
}

/// Vx -= Vy; VF = !borrow
pub fn sub(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let (res, borrow) = cpu.state.v[op.x()].overflowing_sub(cpu.state.v[op.y()]);
    set_with_flag(cpu, op.x(), res, !borrow)
}

/// Vx >>= 1; VF = old bit 0
pub fn shr(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let vx = cpu.state.v[op.x()];
    set_with_flag(cpu, op.x(), vx >> 1, vx & 0x01 == 0x01)
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let (res, borrow) = cpu.state.v[op.y()].overflowing_sub(cpu.state.v[op.x()]);
    set_with_flag(cpu, op.x(), res, !borrow)
}

/// Vx <<= 1; VF = old bit 7
pub fn shl(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let vx = cpu.state.v[op.x()];
    set_with_flag(cpu, op.x(), vx << 1, vx & 0x80 == 0x80)
}

/// if Vx != Vy then pc += 2
pub fn skrne(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let condition = cpu.state.v[op.x()] != cpu.state.v[op.y()];
    skip_if(cpu, condition)
}

/// I = addr
pub fn loadi(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.i = op.addr();
    Ok(Flow::Continue)
}

/// PC = V0 + addr
pub fn jumpi(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.pc = op.addr() + u16::from(cpu.state.v[0x0]);
    Ok(Flow::Continue)
}

/// Vx = rand_byte & kk
pub fn rand(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let rand_byte: u8 = ::rand::random();
    cpu.state.v[op.x()] = rand_byte & op.kk();
    Ok(Flow::Continue)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the n byte sprite at I onto the FrameBuffer at (Vx mod 64, Vy mod 32).
/// Rows and columns past the edge of the screen are clipped, not wrapped.
/// VF = 1 if any set pixel was erased
pub fn draw(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let origin_x = usize::from(cpu.state.v[op.x()]) % DISPLAY_WIDTH;
    let origin_y = usize::from(cpu.state.v[op.y()]) % DISPLAY_HEIGHT;
    let sprite = cpu.state.bytes(cpu.state.index(), usize::from(op.n()))?;

    let collision = cpu.shared.with_frame_buffer(|frame| {
        let mut collision = false;
        for (row, byte) in sprite.iter().enumerate() {
            let y = origin_y + row;
            if y >= DISPLAY_HEIGHT {
                break;
            }
            for bit in 0..8 {
                let x = origin_x + bit;
                if x >= DISPLAY_WIDTH {
                    break;
                }
                if (byte >> (7 - bit)) & 0x1 == 0x1 {
                    let pixel = &mut frame[y * DISPLAY_WIDTH + x];
                    collision |= *pixel == 0x1;
                    *pixel ^= 0x1;
                }
            }
        }
        collision
    });

    cpu.state.v[0xF] = u8::from(collision);
    Ok(Flow::Continue)
}

/// if Vx == key then pc += 2
pub fn skpr(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let condition = cpu.key() == Some(cpu.state.v[op.x()]);
    skip_if(cpu, condition)
}

/// if Vx != key then pc += 2
pub fn skup(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let condition = cpu.key() != Some(cpu.state.v[op.x()]);
    skip_if(cpu, condition)
}

/// Vx = DT
pub fn moved(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.v[op.x()] = cpu.shared.delay_timer();
    Ok(Flow::Continue)
}

/// await keypress for Vx
/// Without a key the pc is wound back so this instruction runs again after the clock waits.
pub fn keyd(cpu: &mut Cpu, op: Opcode) -> Outcome {
    match cpu.key() {
        Some(key) => {
            cpu.state.v[op.x()] = key;
            Ok(Flow::Continue)
        }
        None => {
            cpu.state.pc = current_pc(cpu);
            Ok(Flow::AwaitingKey)
        }
    }
}

/// DT = Vx
pub fn loads(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.shared.set_delay_timer(cpu.state.v[op.x()]);
    Ok(Flow::Continue)
}

/// ST = Vx
/// A nonzero value starts the tone; the timer clock stops it
pub fn ld(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let value = cpu.state.v[op.x()];
    cpu.shared.set_sound_timer(value);
    if value > 0 {
        cpu.start_tone();
    }
    Ok(Flow::Continue)
}

/// I += Vx
pub fn addi(cpu: &mut Cpu, op: Opcode) -> Outcome {
    cpu.state.i = cpu.state.i.wrapping_add(u16::from(cpu.state.v[op.x()]));
    Ok(Flow::Continue)
}

/// I = (Vx & 0xF) * 5
/// Set I to the memory address of the glyph for the low nibble of Vx.
/// The address is computed in a single byte; every glyph sits below 0x100 so nothing is lost.
pub fn ldspr(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let glyph = cpu.state.v[op.x()] & 0x0F;
    cpu.state.i = u16::from(glyph.wrapping_mul(FONT_CHARACTER_SIZE));
    Ok(Flow::Continue)
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let vx = cpu.state.v[op.x()];
    let index = cpu.state.index();
    cpu.state
        .bytes_mut(index, 3)?
        .copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
    Ok(Flow::Continue)
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let v = cpu.state.v;
    let index = cpu.state.index();
    cpu.state
        .bytes_mut(index, op.x() + 1)?
        .copy_from_slice(&v[..=op.x()]);
    Ok(Flow::Continue)
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(cpu: &mut Cpu, op: Opcode) -> Outcome {
    let mut values = [0; 16];
    values[..=op.x()].copy_from_slice(cpu.state.bytes(cpu.state.index(), op.x() + 1)?);
    cpu.state.v[..=op.x()].copy_from_slice(&values[..=op.x()]);
    Ok(Flow::Continue)
}
