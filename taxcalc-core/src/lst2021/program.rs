//! The 2021 program flow.
//!
//! Step names follow the official flowchart (`mpara` = MPARA, `mre4jl` =
//! MRE4JL, ...) so each step can be checked against it. All intermediate
//! values are exact decimals; truncation and round-up happen only where the
//! flowchart prescribes them.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

use super::tables::{index_for_year, tab1, tab2, tab3, tab4, tab5};
use super::{Inputs, Outputs};
use crate::error::CalcError;

fn num(v: i64) -> Decimal {
    Decimal::from(v)
}

fn frac(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

/// Truncates to `dp` decimal places.
fn down(v: Decimal, dp: u32) -> Decimal {
    v.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Rounds away from zero to `dp` decimal places.
fn up(v: Decimal, dp: u32) -> Decimal {
    v.round_dp_with_strategy(dp, RoundingStrategy::AwayFromZero)
}

pub(super) fn run(inputs: Inputs) -> Result<Outputs, CalcError> {
    let mut program = Program::new(inputs)?;
    program.main();
    Ok(program.out)
}

#[derive(Debug, Default)]
struct Program {
    inp: Inputs,
    out: Outputs,
    /// Tax factor as a decimal; 1 unless the factor method is selected.
    f: Decimal,

    alte: Decimal,
    anp: Decimal,
    anteil1: Decimal,
    bbgkvpv: Decimal,
    bbgrv: Decimal,
    bmg: Decimal,
    diff: Decimal,
    efa: Decimal,
    fvb: Decimal,
    fvbso: Decimal,
    fvbz: Decimal,
    fvbzso: Decimal,
    gfb: Decimal,
    hbalte: Decimal,
    hfvb: Decimal,
    hfvbz: Decimal,
    hfvbzso: Decimal,
    hoch: Decimal,
    jbmg: Decimal,
    jlfreib: Decimal,
    jlhinzu: Decimal,
    jw: Decimal,
    kennvmt: i32,
    kfb: Decimal,
    kvsatzag: Decimal,
    kvsatzan: Decimal,
    kztab: i32,
    lst1: Decimal,
    lst2: Decimal,
    lst3: Decimal,
    lstjahr: Decimal,
    lstoso: Decimal,
    lstso: Decimal,
    mist: Decimal,
    pvsatzag: Decimal,
    pvsatzan: Decimal,
    rvsatzan: Decimal,
    rw: Decimal,
    sap: Decimal,
    solzfrei: Decimal,
    solzj: Decimal,
    solzmin: Decimal,
    solzsbmg: Decimal,
    solzszve: Decimal,
    solzvbmg: Decimal,
    st: Decimal,
    st1: Decimal,
    st2: Decimal,
    stovmt: Decimal,
    tbsvorv: Decimal,
    vbezb: Decimal,
    vbezbso: Decimal,
    vergl: Decimal,
    vhb: Decimal,
    vkv: Decimal,
    vsp: Decimal,
    vsp1: Decimal,
    vsp2: Decimal,
    vsp3: Decimal,
    vspn: Decimal,
    w1stkl5: Decimal,
    w2stkl5: Decimal,
    w3stkl5: Decimal,
    x: Decimal,
    y: Decimal,
    zre4: Decimal,
    zre4j: Decimal,
    zre4vp: Decimal,
    ztabfb: Decimal,
    zvbez: Decimal,
    zvbezj: Decimal,
    zve: Decimal,
    zx: Decimal,
    zzx: Decimal,
}

impl Program {
    fn new(inp: Inputs) -> Result<Self, CalcError> {
        // MRE4JL: without the factor method the factor is 1
        let f = if inp.af == 0 {
            Decimal::ONE
        } else {
            Decimal::from_f64(inp.f).ok_or_else(|| CalcError::OutOfRange("f".to_string()))?
        };
        Ok(Self { inp, f, ..Default::default() })
    }

    fn main(&mut self) {
        self.mpara();
        self.mre4jl();
        self.vbezbso = Decimal::ZERO;
        self.kennvmt = 0;
        self.mre4();
        self.mre4abz();
        self.mberech();
        self.msonst();
        self.mvmt();
    }

    /// Contribution ceilings, rates and tariff constants for 2021.
    fn mpara(&mut self) {
        if self.inp.krv < 2 {
            self.bbgrv = if self.inp.krv == 0 { num(85_200) } else { num(80_400) };
            self.rvsatzan = frac(93, 3);
            self.tbsvorv = frac(84, 2);
        }
        self.bbgkvpv = num(58_050);
        self.kvsatzan = self.inp.kvz / num(2) / num(100) + frac(7, 2);
        self.kvsatzag = frac(65, 4) + frac(7, 2);
        if self.inp.pvs == 1 {
            self.pvsatzan = frac(2025, 5);
            self.pvsatzag = frac(1025, 5);
        } else {
            self.pvsatzan = frac(1525, 5);
            self.pvsatzag = frac(1525, 5);
        }
        if self.inp.pvz == 1 {
            self.pvsatzan += frac(25, 4);
        }
        self.w1stkl5 = num(11_237);
        self.w2stkl5 = num(28_959);
        self.w3stkl5 = num(219_690);
        self.gfb = num(9_744);
        self.solzfrei = num(16_956);
    }

    /// Annualizes the period amounts (cents to euros).
    fn mre4jl(&mut self) {
        let lzz = self.inp.lzz;
        let annual = |cents: Decimal| -> Decimal {
            match lzz {
                1 => down(cents / num(100), 2),
                2 => down(cents * num(12) / num(100), 2),
                3 => down(cents * num(360) / num(700), 2),
                _ => down(cents * num(360) / num(100), 2),
            }
        };
        self.zre4j = annual(self.inp.re4);
        self.zvbezj = annual(self.inp.vbez);
        self.jlfreib = annual(self.inp.lzzfreib);
        self.jlhinzu = annual(self.inp.lzzhinzu);
    }

    /// Pension allowances.
    fn mre4(&mut self) {
        if self.zvbezj.is_zero() {
            self.fvbz = Decimal::ZERO;
            self.fvb = Decimal::ZERO;
            self.fvbzso = Decimal::ZERO;
            self.fvbso = Decimal::ZERO;
        } else {
            let j = index_for_year(self.inp.vjahr);
            let zmvb = num(self.inp.zmvb as i64);
            if self.inp.lzz == 1 {
                self.vbezb = self.inp.vbezm * zmvb + self.inp.vbezs;
                self.hfvb = up(tab2(j) / num(12) * zmvb, 0);
                self.fvbz = up(tab3(j) / num(12) * zmvb, 0);
            } else {
                self.vbezb = down(self.inp.vbezm * num(12) + self.inp.vbezs, 2);
                self.hfvb = tab2(j);
                self.fvbz = tab3(j);
            }
            self.fvb = up(self.vbezb * tab1(j) / num(100), 2);
            if self.fvb > self.hfvb {
                self.fvb = self.hfvb;
            }
            if self.fvb > self.zvbezj {
                self.fvb = self.zvbezj;
            }
            self.fvbso = up(self.fvb + self.vbezbso * tab1(j) / num(100), 2);
            if self.fvbso > tab2(j) {
                self.fvbso = tab2(j);
            }
            self.hfvbzso = down((self.vbezb + self.vbezbso) / num(100) - self.fvbso, 2);
            self.fvbzso = up(self.fvbz + self.vbezbso / num(100), 0);
            if self.fvbzso > self.hfvbzso {
                self.fvbzso = up(self.hfvbzso, 0);
            }
            if self.fvbzso > tab3(j) {
                self.fvbzso = tab3(j);
            }
            self.hfvbz = down(self.vbezb / num(100) - self.fvb, 2);
            if self.fvbz > self.hfvbz {
                self.fvbz = up(self.hfvbz, 0);
            }
        }
        self.mre4alte();
    }

    /// Old-age relief.
    fn mre4alte(&mut self) {
        if self.inp.alter1 == 0 {
            self.alte = Decimal::ZERO;
        } else {
            let k = index_for_year(self.inp.ajahr);
            self.bmg = self.zre4j - self.zvbezj;
            self.alte = up(self.bmg * tab4(k), 0);
            self.hbalte = tab5(k);
            if self.alte > self.hbalte {
                self.alte = self.hbalte;
            }
        }
    }

    fn mre4abz(&mut self) {
        self.zre4 = down(self.zre4j - self.fvb - self.alte - self.jlfreib + self.jlhinzu, 2);
        if self.zre4.is_sign_negative() {
            self.zre4 = Decimal::ZERO;
        }
        self.zre4vp = self.zre4j;
        if self.kennvmt == 2 {
            self.zre4vp = down(self.zre4vp - self.inp.entsch / num(100), 2);
        }
        self.zvbez = down(self.zvbezj - self.fvb, 2);
        if self.zvbez.is_sign_negative() {
            self.zvbez = Decimal::ZERO;
        }
    }

    /// Tax on the regular wage for the period.
    fn mberech(&mut self) {
        self.mztabfb();
        self.out.vfrb = down((self.anp + self.fvb + self.fvbz) * num(100), 0);
        self.mlstjahr();
        self.out.wvfrb = down((self.zve - self.gfb) * num(100), 0);
        if self.out.wvfrb.is_sign_negative() {
            self.out.wvfrb = Decimal::ZERO;
        }
        self.lstjahr = down(self.st * self.f, 0);
        self.uplstlzz();
        self.upvkvlzz();
        if self.inp.zkf > Decimal::ZERO {
            self.ztabfb += self.kfb;
            self.mre4abz();
            self.mlstjahr();
            self.jbmg = down(self.st * self.f, 0);
        } else {
            self.jbmg = self.lstjahr;
        }
        self.msolz();
    }

    /// Table allowances: employee lump sum, special expenses, child allowances.
    fn mztabfb(&mut self) {
        self.anp = Decimal::ZERO;
        if !self.zvbez.is_sign_negative() && self.zvbez < self.fvbz {
            self.fvbz = self.zvbez.trunc();
        }
        if self.inp.stkl < 6 {
            if self.zvbez > Decimal::ZERO {
                if self.zvbez - self.fvbz < num(102) {
                    self.anp = up(self.zvbez - self.fvbz, 0);
                } else {
                    self.anp = num(102);
                }
            }
        } else {
            self.fvbz = Decimal::ZERO;
            self.fvbzso = Decimal::ZERO;
        }
        if self.inp.stkl < 6 && self.zre4 > self.zvbez {
            if self.zre4 - self.zvbez < num(1000) {
                self.anp = up(self.anp + self.zre4 - self.zvbez, 0);
            } else {
                self.anp += num(1000);
            }
        }
        self.kztab = 1;
        match self.inp.stkl {
            1 => {
                self.sap = num(36);
                self.kfb = down(self.inp.zkf * num(8388), 0);
            }
            2 => {
                self.efa = num(4008);
                self.sap = num(36);
                self.kfb = down(self.inp.zkf * num(8388), 0);
            }
            3 => {
                self.kztab = 2;
                self.sap = num(36);
                self.kfb = down(self.inp.zkf * num(8388), 0);
            }
            4 => {
                self.sap = num(36);
                self.kfb = down(self.inp.zkf * num(4194), 0);
            }
            5 => {
                self.sap = num(36);
                self.kfb = Decimal::ZERO;
            }
            _ => self.kfb = Decimal::ZERO,
        }
        self.ztabfb = down(self.efa + self.anp + self.sap + self.fvbz, 2);
    }

    /// Annual wage tax on the taxable income.
    fn mlstjahr(&mut self) {
        self.upevp();
        if self.kennvmt != 1 {
            self.zve = down(self.zre4 - self.ztabfb - self.vsp, 2);
            self.upmlst();
        } else {
            let extra = self.inp.vmt / num(100) + self.inp.vkapa / num(100);
            self.zve = down(self.zre4 - self.ztabfb - self.vsp - extra, 2);
            if self.zve.is_sign_negative() {
                self.zve = down((self.zve + extra) / num(5), 2);
                self.upmlst();
                self.st = down(self.st * num(5), 0);
            } else {
                self.upmlst();
                self.stovmt = self.st;
                self.zve = down(self.zve + (self.inp.vmt + self.inp.vkapa) / num(500), 2);
                self.upmlst();
                self.st = down((self.st - self.stovmt) * num(5) + self.stovmt, 0);
            }
        }
    }

    fn upvkvlzz(&mut self) {
        self.upvkv();
        self.jw = self.vkv;
        self.upanteil();
        self.out.vkvlzz = self.anteil1;
    }

    /// Private health and care insurance contributions.
    fn upvkv(&mut self) {
        self.vkv = if self.inp.pkv > 0 {
            if self.vsp2 > self.vsp3 {
                self.vsp2 * num(100)
            } else {
                self.vsp3 * num(100)
            }
        } else {
            Decimal::ZERO
        };
    }

    fn uplstlzz(&mut self) {
        self.jw = self.lstjahr * num(100);
        self.upanteil();
        self.out.lstlzz = self.anteil1;
    }

    fn upmlst(&mut self) {
        if self.zve < Decimal::ONE {
            self.zve = Decimal::ZERO;
            self.x = Decimal::ZERO;
        } else {
            self.x = down(self.zve / num(self.kztab as i64), 0);
        }
        if self.inp.stkl < 5 {
            self.uptab21();
        } else {
            self.mst5_6();
        }
    }

    /// Provision allowance (pension, health and care insurance).
    fn upevp(&mut self) {
        if self.inp.krv > 1 {
            self.vsp1 = Decimal::ZERO;
        } else {
            if self.zre4vp > self.bbgrv {
                self.zre4vp = self.bbgrv;
            }
            self.vsp1 = down(self.zre4vp * self.tbsvorv, 2);
            self.vsp1 = down(self.vsp1 * self.rvsatzan, 2);
        }
        self.vsp2 = down(self.zre4vp * frac(12, 2), 2);
        self.vhb = if self.inp.stkl == 3 { num(3000) } else { num(1900) };
        if self.vsp2 > self.vhb {
            self.vsp2 = self.vhb;
        }
        self.vspn = up(self.vsp1 + self.vsp2, 0);
        self.mvsp();
        if self.vspn > self.vsp {
            self.vsp = down(self.vspn, 2);
        }
    }

    fn mvsp(&mut self) {
        if self.zre4vp > self.bbgkvpv {
            self.zre4vp = self.bbgkvpv;
        }
        if self.inp.pkv > 0 {
            if self.inp.stkl == 6 {
                self.vsp3 = Decimal::ZERO;
            } else {
                self.vsp3 = self.inp.pkpv * num(12) / num(100);
                if self.inp.pkv == 2 {
                    self.vsp3 = down(self.vsp3 - self.zre4vp * (self.kvsatzag + self.pvsatzag), 2);
                }
            }
        } else {
            self.vsp3 = down(self.zre4vp * (self.kvsatzan + self.pvsatzan), 2);
        }
        self.vsp = up(self.vsp3 + self.vsp1, 0);
    }

    /// Tax for classes V and VI.
    fn mst5_6(&mut self) {
        self.zzx = self.x;
        if self.zzx > self.w2stkl5 {
            self.zx = self.w2stkl5;
            self.up5_6();
            if self.zzx > self.w3stkl5 {
                self.st = down(self.st + (self.w3stkl5 - self.w2stkl5) * frac(42, 2), 0);
                self.st = down(self.st + (self.zzx - self.w3stkl5) * frac(45, 2), 0);
            } else {
                self.st = down(self.st + (self.zzx - self.w2stkl5) * frac(42, 2), 0);
            }
        } else {
            self.zx = self.zzx;
            self.up5_6();
            if self.zzx > self.w1stkl5 {
                self.vergl = self.st;
                self.zx = self.w1stkl5;
                self.up5_6();
                self.hoch = down(self.st + (self.zzx - self.w1stkl5) * frac(42, 2), 0);
                self.st = if self.hoch < self.vergl { self.hoch } else { self.vergl };
            }
        }
    }

    fn up5_6(&mut self) {
        self.x = down(self.zx * frac(125, 2), 2);
        self.uptab21();
        self.st1 = self.st;
        self.x = down(self.zx * frac(75, 2), 2);
        self.uptab21();
        self.st2 = self.st;
        self.diff = (self.st1 - self.st2) * num(2);
        self.mist = down(self.zx * frac(14, 2), 0);
        self.st = if self.mist > self.diff { self.mist } else { self.diff };
    }

    /// Solidarity surcharge and church-tax base on the regular wage.
    fn msolz(&mut self) {
        self.solzfrei *= num(self.kztab as i64);
        if self.jbmg > self.solzfrei {
            self.solzj = down(self.jbmg * frac(55, 1) / num(100), 2);
            self.solzmin = down((self.jbmg - self.solzfrei) * frac(119, 1) / num(100), 2);
            if self.solzmin < self.solzj {
                self.solzj = self.solzmin;
            }
            self.jw = down(self.solzj * num(100), 0);
            self.upanteil();
            self.out.solzlzz = self.anteil1;
        } else {
            self.out.solzlzz = Decimal::ZERO;
        }
        if self.inp.r > 0 {
            self.jw = self.jbmg * num(100);
            self.upanteil();
            self.out.bk = self.anteil1;
        } else {
            self.out.bk = Decimal::ZERO;
        }
    }

    /// Share of an annual amount for the payroll period.
    fn upanteil(&mut self) {
        self.anteil1 = match self.inp.lzz {
            1 => self.jw,
            2 => down(self.jw / num(12), 0),
            3 => down(self.jw * num(7) / num(360), 0),
            _ => down(self.jw / num(360), 0),
        };
    }

    /// 2021 income tax tariff.
    fn uptab21(&mut self) {
        if self.x < self.gfb + Decimal::ONE {
            self.st = Decimal::ZERO;
        } else if self.x < num(14_754) {
            self.y = down((self.x - self.gfb) / num(10_000), 6);
            self.rw = self.y * frac(99521, 2);
            self.rw += num(1400);
            self.st = down(self.rw * self.y, 0);
        } else if self.x < num(57_919) {
            self.y = down((self.x - num(14_753)) / num(10_000), 6);
            self.rw = self.y * frac(20885, 2);
            self.rw += num(2397);
            self.rw *= self.y;
            self.st = down(self.rw + frac(95096, 2), 0);
        } else if self.x < num(274_613) {
            self.st = down(self.x * frac(42, 2) - frac(913_663, 2), 0);
        } else {
            self.st = down(self.x * frac(45, 2) - frac(1_737_499, 2), 0);
        }
        self.st *= num(self.kztab as i64);
    }

    /// Other (non-recurring) payments.
    fn msonst(&mut self) {
        self.inp.lzz = 1;
        if self.inp.zmvb == 0 {
            self.inp.zmvb = 12;
        }
        if self.inp.sonstb.is_zero() {
            self.out.vkvsonst = Decimal::ZERO;
            self.lstso = Decimal::ZERO;
            self.out.sts = Decimal::ZERO;
            self.out.solzs = Decimal::ZERO;
            self.out.bks = Decimal::ZERO;
        } else {
            self.mosonst();
            self.upvkv();
            self.out.vkvsonst = self.vkv;
            self.zre4j = down((self.inp.jre4 + self.inp.sonstb) / num(100), 2);
            self.zvbezj = down((self.inp.jvbez + self.inp.vbs) / num(100), 2);
            self.vbezbso = self.inp.sterbe;
            self.mre4sonst();
            self.mlstjahr();
            self.out.wvfrbm = down((self.zve - self.gfb) * num(100), 2);
            if self.out.wvfrbm.is_sign_negative() {
                self.out.wvfrbm = Decimal::ZERO;
            }
            self.upvkv();
            self.out.vkvsonst = self.vkv - self.out.vkvsonst;
            self.lstso = self.st * num(100);
            self.out.sts = down((self.lstso - self.lstoso) * self.f / num(100), 0) * num(100);
            if self.out.sts.is_sign_negative() {
                self.out.sts = Decimal::ZERO;
            }
            self.msolzsts();
            self.out.bks = if self.inp.r > 0 { self.out.sts } else { Decimal::ZERO };
        }
    }

    /// Solidarity surcharge on other payments.
    fn msolzsts(&mut self) {
        self.solzszve = if self.inp.zkf > Decimal::ZERO { self.zve - self.kfb } else { self.zve };
        if self.solzszve < Decimal::ONE {
            self.solzszve = Decimal::ZERO;
            self.x = Decimal::ZERO;
        } else {
            self.x = down(self.solzszve / num(self.kztab as i64), 0);
        }
        if self.inp.stkl < 5 {
            self.uptab21();
        } else {
            self.mst5_6();
        }
        self.solzsbmg = down(self.st * self.f, 0);
        self.out.solzs = if self.solzsbmg > self.solzfrei {
            down(self.out.sts * frac(55, 1) / num(100), 0)
        } else {
            Decimal::ZERO
        };
    }

    /// Multi-year compensation and capitalized pension payments.
    fn mvmt(&mut self) {
        if self.inp.vkapa.is_sign_negative() {
            self.inp.vkapa = Decimal::ZERO;
        }
        if self.inp.vmt + self.inp.vkapa > Decimal::ZERO {
            if self.lstso.is_zero() {
                self.mosonst();
                self.lst1 = self.lstoso;
            } else {
                self.lst1 = self.lstso;
            }
            self.vbezbso = self.inp.sterbe + self.inp.vkapa;
            self.zre4j = down(
                (self.inp.jre4 + self.inp.sonstb + self.inp.vmt + self.inp.vkapa) / num(100),
                2,
            );
            self.zvbezj = down((self.inp.jvbez + self.inp.vbs + self.inp.vkapa) / num(100), 2);
            self.kennvmt = 2;
            self.mre4sonst();
            self.mlstjahr();
            self.lst3 = self.st * num(100);
            self.mre4abz();
            self.zre4vp = self.zre4vp - self.inp.jre4ent / num(100) - self.inp.sonstent / num(100);
            self.kennvmt = 1;
            self.mlstjahr();
            self.lst2 = self.st * num(100);
            self.out.stv = self.lst2 - self.lst1;
            self.lst3 -= self.lst1;
            if self.lst3 < self.out.stv {
                self.out.stv = self.lst3;
            }
            if self.out.stv.is_sign_negative() {
                self.out.stv = Decimal::ZERO;
            } else {
                self.out.stv = down(self.out.stv * self.f / num(100), 0) * num(100);
            }
            self.solzvbmg = down(self.out.stv / num(100), 0) + self.jbmg;
            self.out.solzv = if self.solzvbmg > self.solzfrei {
                down(self.out.stv * frac(55, 1) / num(100), 0)
            } else {
                Decimal::ZERO
            };
            self.out.bkv = if self.inp.r > 0 { self.out.stv } else { Decimal::ZERO };
        } else {
            self.out.stv = Decimal::ZERO;
            self.out.solzv = Decimal::ZERO;
            self.out.bkv = Decimal::ZERO;
        }
    }

    /// Tax on the annual wage without other payments.
    fn mosonst(&mut self) {
        self.zre4j = down(self.inp.jre4 / num(100), 2);
        self.zvbezj = down(self.inp.jvbez / num(100), 2);
        self.jlfreib = down(self.inp.jfreib / num(100), 2);
        self.jlhinzu = down(self.inp.jhinzu / num(100), 2);
        self.mre4();
        self.mre4abz();
        self.zre4vp -= self.inp.jre4ent / num(100);
        self.mztabfb();
        self.out.vfrbs1 = down((self.anp + self.fvb + self.fvbz) * num(100), 2);
        self.mlstjahr();
        self.out.wvfrbo = down((self.zve - self.gfb) * num(100), 2);
        if self.out.wvfrbo.is_sign_negative() {
            self.out.wvfrbo = Decimal::ZERO;
        }
        self.lstoso = self.st * num(100);
    }

    /// Annual wage including other payments.
    fn mre4sonst(&mut self) {
        self.mre4();
        self.fvb = self.fvbso;
        self.mre4abz();
        self.zre4vp = self.zre4vp - self.inp.jre4ent / num(100) - self.inp.sonstent / num(100);
        self.fvbz = self.fvbzso;
        self.mztabfb();
        self.out.vfrbs2 = (self.anp + self.fvb + self.fvbz) * num(100) - self.out.vfrbs1;
    }
}
