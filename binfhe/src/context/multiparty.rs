use std::sync::Arc;

use binfhe_engine::{
    entities::{
        AccumulatorKey, CommonReferenceString, DecryptionShare, KeySwitchKey, LweCiphertext,
        LwePrivateKey, LwePublicKey, RgswCiphertext,
    },
    ops::{lwe, rgsw},
};
use log::debug;

use crate::{BinFheContext, Error, Result};

impl BinFheContext {
    /// Combine secret key shares into the joint key `sum s_i`.
    ///
    /// # Remarks
    /// Only useful for testing; no party holds every share in a real deployment.
    pub fn multiparty_key_gen(&self, shares: &[LwePrivateKey]) -> Result<LwePrivateKey> {
        Ok(lwe::multiparty_key_gen(shares)?)
    }

    /// Add the ring secret share `z_i` to the public key `prev`, produced by
    /// [`BinFheContext::pub_key_gen`] for the first party and by this method for the others.
    pub fn multiparty_pub_key_gen(
        &self,
        z_i: &LwePrivateKey,
        prev: &LwePublicKey,
    ) -> Result<LwePublicKey> {
        Ok(lwe::multiparty_pub_key_gen(self.params.lwe(), z_i, prev)?)
    }

    /// One party's round of threshold key switching key generation, from `z_i` (dimension `N`)
    /// to `s_i` (dimension `n`).
    ///
    /// # Remarks
    /// The first party passes no `prev_ksk` and samples the shared masks. Every later party
    /// passes the previous party's key and reuses its masks. The lead party runs last and
    /// checks every party contributed.
    ///
    /// The resulting key and the joint public key `pk` become this context's key switching and
    /// public keys, for [`BinFheContext::encrypt_public`] and
    /// [`BinFheContext::multiparty_bt_key_gen`].
    pub fn multi_party_key_gen(
        &mut self,
        s_i: &LwePrivateKey,
        z_i: &LwePrivateKey,
        pk: &LwePublicKey,
        prev_ksk: Option<&KeySwitchKey>,
        lead: bool,
    ) -> Result<()> {
        let lwe = self.params.lwe();
        let parties = self.params.parties();

        let ksk = match prev_ksk {
            Some(prev) => lwe::multiparty_key_switch_gen(lwe, s_i, z_i, prev)?,
            None => lwe::key_switch_gen(lwe, s_i, z_i)?,
        };

        if lead && ksk.parties() != parties {
            return Err(binfhe_engine::Error::PartyCountMismatch {
                expected: parties,
                actual: ksk.parties(),
            }
            .into());
        }

        debug!(
            "threshold key switching round: {} of {parties} parties, lead {lead}",
            ksk.parties()
        );

        self.ksk = Some(Arc::new(ksk));
        self.public_key = Some(Arc::new(pk.clone()));

        Ok(())
    }

    /// Sample a common reference string for RGSW encryptions under the default gadget base.
    pub fn generate_acrs(&self) -> Result<CommonReferenceString> {
        Ok(rgsw::generate_acrs(self.params.rgsw(), self.base())?)
    }

    /// One party's share of a threshold RGSW encryption of `m` under the ring secret share
    /// `z_i`, with masks from `acrs`. Only the lead party's share carries `m`.
    pub fn rgsw_encrypt(
        &self,
        acrs: &CommonReferenceString,
        z_i: &LwePrivateKey,
        m: i64,
        lead: bool,
    ) -> Result<RgswCiphertext> {
        Ok(rgsw::encrypt_rgsw_partial(
            self.params.rgsw(),
            acrs,
            z_i,
            m,
            lead,
        )?)
    }

    /// Sum two threshold RGSW shares made from `acrs`.
    pub fn rgsw_eval_add(
        &self,
        acrs: &CommonReferenceString,
        lhs: &RgswCiphertext,
        rhs: &RgswCiphertext,
    ) -> Result<RgswCiphertext> {
        Ok(rgsw::rgsw_eval_add(self.params.rgsw(), acrs, lhs, rhs)?)
    }

    /// Recover the constant an RGSW ciphertext encrypts under `z`.
    pub fn rgsw_decrypt(&self, z: &LwePrivateKey, ct: &RgswCiphertext) -> Result<i64> {
        Ok(rgsw::rgsw_decrypt(self.params.rgsw(), z, ct)?)
    }

    /// One party's round of threshold accumulator key generation.
    ///
    /// # Remarks
    /// Appends a GINX block for `s_i` to `prev`, the key from the previous round (`None` for
    /// the first party). `joint_zero` is the sum of every party's
    /// [`BinFheContext::rgsw_encrypt`] share of zero under `acrs`. The lead party runs last
    /// and checks the key holds a block from every party.
    ///
    /// The result is paired with `ksk` and the context's public key and installed as the
    /// active bootstrapping key. Its accumulator key is the next party's `prev`.
    pub fn multiparty_bt_key_gen(
        &mut self,
        s_i: &LwePrivateKey,
        prev: Option<&AccumulatorKey>,
        acrs: &CommonReferenceString,
        joint_zero: &RgswCiphertext,
        ksk: Arc<KeySwitchKey>,
        lead: bool,
    ) -> Result<()> {
        if acrs.base() != self.base() {
            return Err(binfhe_engine::Error::ReferenceStringMismatch.into());
        }

        let key = self.engine.multiparty_key_gen(
            s_i,
            prev,
            acrs,
            joint_zero,
            ksk,
            self.public_key.clone(),
            lead,
            self.params.parties(),
        )?;

        self.install(key);

        Ok(())
    }

    /// The lead party's decryption share of `ct` under its secret share `s_i`.
    ///
    /// # Panics
    /// If the share and ciphertext dimensions differ.
    pub fn multiparty_decrypt_lead(
        &self,
        s_i: &LwePrivateKey,
        ct: &LweCiphertext,
    ) -> DecryptionShare {
        lwe::multiparty_decrypt_lead(self.params.lwe(), s_i, ct)
    }

    /// A non-lead party's decryption share of `ct` under its secret share `s_i`.
    ///
    /// # Panics
    /// If the share and ciphertext dimensions differ.
    pub fn multiparty_decrypt_main(
        &self,
        s_i: &LwePrivateKey,
        ct: &LweCiphertext,
    ) -> DecryptionShare {
        lwe::multiparty_decrypt_main(self.params.lwe(), s_i, ct)
    }

    /// Combine every party's decryption share into the plaintext mod `p`.
    ///
    /// # Remarks
    /// Exactly one share per configured party is required, exactly one of them the lead's.
    /// Missing or duplicated shares would otherwise decode to a wrong plaintext.
    pub fn multiparty_decrypt_fusion(&self, shares: &[DecryptionShare], p: u64) -> Result<u64> {
        let parties = self.params.parties();
        let leads = shares.iter().filter(|s| s.lead).count();

        if shares.len() != parties || leads != 1 {
            return Err(Error::InsufficientDecryptionShares {
                expected: parties,
                actual: shares.len(),
                leads,
            });
        }

        Ok(lwe::multiparty_decrypt_fusion(shares, p)?)
    }
}
