/*
 * Sigil Recognizer: resource gate
 *
 * Builds on the $-family recognizers ($P, $P+, $Q), rust version by
 * Ferran Pujol Camins.
 *
 * Original authors:
 * 
 * 	    Radu-Daniel Vatavu, Ph.D.
 *	    University Stefan cel Mare of Suceava
 *	    Suceava 720229, Romania
 *	    vatavu@eed.usv.ro
 *
 *	    Lisa Anthony, Ph.D.
 *      UMBC
 *      Information Systems Department
 *      1000 Hilltop Circle
 *      Baltimore, MD 21250
 *      lanthony@umbc.edu
 *
 *	    Jacob O. Wobbrock, Ph.D.
 * 	    The Information School
 *	    University of Washington
 *	    Seattle, WA 98195-2840
 *	    wobbrock@uw.edu
 *
 * The academic publication for the $P recognizer, and what should be 
 * used to cite it, is:
 *
 *	Vatavu, R.-D., Anthony, L. and Wobbrock, J.O. (2012).  
 *	  Gestures as point clouds: A $P recognizer for user interface 
 *	  prototypes. Proceedings of the ACM Int'l Conference on  
 *	  Multimodal Interfaces (ICMI '12). Santa Monica, California  
 *	  (October 22-26, 2012). New York: ACM Press, pp. 273-280.
 *
 * This software is distributed under the "New BSD License" agreement:
 *
 * Copyright (c) 2012, Radu-Daniel Vatavu, Lisa Anthony, and 
 * Jacob O. Wobbrock. All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without
 * modification, are permitted provided that the following conditions are met:
 *    * Redistributions of source code must retain the above copyright
 *      notice, this list of conditions and the following disclaimer.
 *    * Redistributions in binary form must reproduce the above copyright
 *      notice, this list of conditions and the following disclaimer in the
 *      documentation and/or other materials provided with the distribution.
 *    * Neither the names of the University Stefan cel Mare of Suceava, 
 *	    University of Washington, nor UMBC, nor the names of its contributors 
 *	    may be used to endorse or promote products derived from this software 
 *	    without specific prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
 * IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
 * THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
 * PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL Radu-Daniel Vatavu OR Lisa Anthony
 * OR Jacob O. Wobbrock OR Ferran Pujol Camins BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, 
 * EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT 
 * OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS 
 * INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, 
 * STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY
 * OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF
 * SUCH DAMAGE.
**/

use crate::{matcher::Recognition, session::Cast};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// Host-side bookkeeping asked whether a recognized sign may be paid for.
pub trait ResourceGate {
    /// Deducts `cost` and returns true if it can be afforded; leaves the balance untouched otherwise
    fn try_spend(&mut self, cost: f32) -> bool;
}

/// A plain mana bar, passed explicitly to whoever casts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManaPool {
    pub current: f32,
    pub max: f32,
}

impl ManaPool {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Adds mana, capped at the maximum
    pub fn refill(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl ResourceGate for ManaPool {
    fn try_spend(&mut self, cost: f32) -> bool {
        if cost > self.current {
            return false;
        }
        self.current -= cost;
        true
    }
}

/// A recognized sign and whether its cost was paid.
/// Unpaid signs are still reported; what to do with them is up to the effect code.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub sign: Recognition,
    pub activated: bool,
}

impl Cast {
    /// Asks the gate to pay for each sign, in draw order
    pub fn activate<G: ResourceGate + ?Sized>(&self, gate: &mut G) -> Vec<Activation> {
        self.signs
            .iter()
            .map(|sign| {
                let activated = gate.try_spend(sign.cost);
                if !activated {
                    log::debug!("cannot afford {:?} (cost {})", sign.id, sign.cost);
                }
                Activation {
                    sign: sign.clone(),
                    activated,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ShapeKind;

    fn sign(id: &str, cost: f32) -> Recognition {
        Recognition {
            id: id.into(),
            kind: ShapeKind::Other,
            cost,
            score: 0.5,
        }
    }

    #[test]
    fn pool_spends_only_what_it_has() {
        let mut pool = ManaPool::full(10.0);
        assert!(pool.try_spend(4.0));
        assert!(!pool.try_spend(7.0));
        assert_eq!(pool.current, 6.0);
        pool.refill(100.0);
        assert_eq!(pool.current, 10.0);
    }

    #[test]
    fn activation_follows_draw_order() {
        let cast = Cast {
            signs: vec![sign("Fire", 6.0), sign("Ice", 6.0), sign("Spark", 3.0)],
            is_combo: true,
        };
        let mut pool = ManaPool::full(10.0);
        let activations = cast.activate(&mut pool);
        let flags: Vec<bool> = activations.iter().map(|a| a.activated).collect();
        assert_eq!(flags, [true, false, true]);
        assert_eq!(activations[1].sign.id, "Ice");
        assert_eq!(pool.current, 1.0);
    }

    #[test]
    fn custom_gates_are_supported() {
        struct Free;
        impl ResourceGate for Free {
            fn try_spend(&mut self, _cost: f32) -> bool {
                true
            }
        }
        let cast = Cast {
            signs: vec![sign("Fire", 1e6)],
            is_combo: false,
        };
        assert!(cast.activate(&mut Free)[0].activated);
    }
}
