/*
    This module implements the BIP341 key tweak and the script tree hashing
    that produces the commitment it tweaks with.

    An output key Q commits to an internal key P and an optional script
    tree root h:
        t = TapTweak(P.x || h)
        Q = P + t*G
    The private key for Q is the even-Y normalized internal key plus t.
*/
use log::debug;

use crate::{
    ecc::{point::Point, scalar::Scalar},
    error::{CurveError, TaprootError},
    hash::{sha256, tagged_hashes, TaggedHash},
    key::PrivateKey,
    tx::encode::write_var_bytes,
};

/// Leaf version for BIP342 tapscript.
pub const TAPROOT_LEAF_TAPSCRIPT: u8 = 0xc0;

tagged_hashes!(TapTweakHash, "TapTweak"); // Final key tweak
tagged_hashes!(TapLeafHash, "TapLeaf"); // Script tree leaves
tagged_hashes!(TapBranchHash, "TapBranch"); // Two child nodes combined

impl TapLeafHash {
    /// Hash of a leaf: version byte followed by the length-prefixed script.
    pub fn from_script(version: u8, script: &[u8]) -> [u8; 32] {
        let mut prefixed = Vec::with_capacity(script.len() + 9);
        // writes into a Vec cannot fail
        let _ = write_var_bytes(&mut prefixed, script);
        TapLeafHash::hash(&[&[version], &prefixed])
    }
}

impl TapBranchHash {
    /// Children are hashed in lexicographic order so a branch commits to the
    /// pair regardless of which side each child sits on.
    pub fn combined_hash(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
        let (small, large) = if b < a { (b, a) } else { (a, b) };
        TapBranchHash::hash(&[small, large])
    }
}

/**
    A node of a taproot script tree. `Hash` stands in for a subtree that is
    only known by its hash, for example a pruned branch of a control block.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TapNode {
    Leaf { version: u8, script: Vec<u8> },
    Hash([u8; 32]),
    Branch(Box<TapNode>, Box<TapNode>),
}

impl TapNode {
    /// Tapscript leaf.
    pub fn leaf(script: Vec<u8>) -> Self {
        TapNode::Leaf {
            version: TAPROOT_LEAF_TAPSCRIPT,
            script,
        }
    }

    pub fn branch(left: TapNode, right: TapNode) -> Self {
        TapNode::Branch(Box::new(left), Box::new(right))
    }

    /**
        Builds the most balanced tree from a list of scripts by repeatedly
        pairing neighbours. A node left without a partner moves up a level
        unchanged. Returns `None` for an empty list.
    */
    pub fn from_scripts(scripts: &[Vec<u8>]) -> Option<Self> {
        let mut level: Vec<TapNode> = scripts.iter().cloned().map(TapNode::leaf).collect();
        if level.is_empty() {
            return None;
        }

        while level.len() > 1 {
            let mut parents = Vec::with_capacity((level.len() + 1) / 2);
            let mut nodes = level.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => parents.push(TapNode::branch(left, right)),
                    None => parents.push(left),
                }
            }
            level = parents;
        }
        level.pop()
    }

    /// TapLeaf or TapBranch hash of this node. The root's hash is the
    /// commitment passed to the key tweak.
    pub fn hash(&self) -> [u8; 32] {
        match self {
            TapNode::Leaf { version, script } => TapLeafHash::from_script(*version, script),
            TapNode::Hash(hash) => *hash,
            TapNode::Branch(left, right) => TapBranchHash::combined_hash(&left.hash(), &right.hash()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TapNode::Leaf { .. })
    }
}

/// The scalar t for an x-only key and commitment, rejected outside [1, N).
fn tweak_scalar(x_only: &[u8; 32], commitment: &[u8]) -> Result<Scalar, TaprootError> {
    let t = TapTweakHash::hash(&[x_only, commitment]);
    match Scalar::from_bytes(&t) {
        Some(t) if !t.is_zero() => Ok(t),
        _ => {
            debug!("taproot tweak rejected: tweak hash is not a valid scalar");
            Err(TaprootError::InvalidTweak)
        }
    }
}

/**
    Tweaks an x-only public key with `commitment`, which is the merkle root
    of the script tree or empty for a key-path-only output.

    Returns the x-only output key and whether its Y coordinate is odd; the
    parity goes into the control block of script path spends.
*/
pub fn tweak_public_key(public_key: &[u8; 32], commitment: &[u8]) -> Result<([u8; 32], bool), TaprootError> {
    let internal = Point::lift_x(public_key)?;
    let t = tweak_scalar(public_key, commitment)?;

    // Q = P + t*G
    let tweaked = internal.mul_add_generator(&t, &Scalar::ONE);
    let (x, y) = tweaked.coordinates().ok_or(CurveError::PointAtInfinity)?;
    Ok((x.to_bytes(), y.is_odd()))
}

/**
    Tweaks a private key with `commitment`. The key is negated first when
    its public key has an odd Y coordinate, matching the x-only internal key
    that `tweak_public_key` is given.
*/
pub fn tweak_private_key(key: &PrivateKey, commitment: &[u8]) -> Result<PrivateKey, TaprootError> {
    let public_key = key.public_key();
    let normalized = if public_key.has_even_y() { key.clone() } else { key.negate() };

    let t = tweak_scalar(&public_key.x_only_bytes(), commitment)?;
    PrivateKey::from_scalar(*normalized.scalar() + t).map_err(|_| {
        debug!("taproot tweak rejected: tweaked private key is zero");
        TaprootError::ZeroTweakedKey
    })
}

/**
    The BIP341 NUMS point H: the x-only lift of SHA256 of the uncompressed
    generator. Nobody knows its discrete log, so an output using it as the
    internal key can only be spent through the script path.
*/
pub fn nums_point() -> Result<[u8; 32], CurveError> {
    let generator = Point::generator().serialize(crate::ecc::PointEncoding::Uncompressed)?;
    let h = sha256(generator);
    Point::lift_x(&h)?;
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::schnorr::{sign_schnorr, verify_schnorr};
    use rand::{thread_rng, RngCore};
    use secp256k1::Secp256k1;

    fn h32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn bip341_public_key_tweaks() {
        let cases = [
            (
                "d6889cb081036e0faefa3a35157ad71086b123b2b144b649798b494c300a961d",
                "",
                "53a1f6e454df1aa2776a2814a721372d6258050de330b3c6d10ee8f4e0dda343",
                true,
            ),
            (
                "187791b6f712a8ea41c8ecdd0ee77fab3e85263b37e1ec18a3651926b3a6cf27",
                "5b75adecf53548f3ec6ad7d78383bf84cc57b55a3127c72b9a2481752dd88b21",
                "147c9c57132f6e7ecddba9800bb0c4449251c92a1e60371ee77557b6620f3ea3",
                true,
            ),
            (
                "93478e9488f956df2396be2ce6c5cced75f900dfa18e7dabd2428aae78451820",
                "c525714a7f49c28aedbbba78c005931a81c234b2f6c99a73e4d06082adc8bf2b",
                "e4d810fd50586274face62b8a807eb9719cef49c04177cc6b76a9a4251d5450e",
                false,
            ),
        ];
        for (internal, commitment, expected, odd) in cases.iter() {
            let commitment = hex::decode(commitment).unwrap();
            let (tweaked, parity) = tweak_public_key(&h32(internal), &commitment).unwrap();
            assert_eq!(hex::encode(tweaked), *expected);
            assert_eq!(parity, *odd);
        }
    }

    #[test]
    fn bip341_private_key_tweaks() {
        let cases = [
            (
                "6b973d88838f27366ed61c9ad6367663045cb456e28335c109e30717ae0c6baa",
                "",
                "2405b971772ad26915c8dcdf10f238753a9b837e5f8e6a86fd7c0cce5b7296d9",
            ),
            (
                "1e4da49f6aaf4e5cd175fe08a32bb5cb4863d963921255f33d3bc31e1343907f",
                "5b75adecf53548f3ec6ad7d78383bf84cc57b55a3127c72b9a2481752dd88b21",
                "ea260c3b10e60f6de018455cd0278f2f5b7e454be1999572789e6a9565d26080",
            ),
            (
                "d3c7af07da2d54f7a7735d3d0fc4f0a73164db638b2f2f7c43f711f6d4aa7e64",
                "c525714a7f49c28aedbbba78c005931a81c234b2f6c99a73e4d06082adc8bf2b",
                "97323385e57015b75b0339a549c56a948eb961555973f0951f555ae6039ef00d",
            ),
        ];
        for (key, commitment, expected) in cases.iter() {
            let key = PrivateKey::from_bytes(&h32(key)).unwrap();
            let tweaked = tweak_private_key(&key, &hex::decode(commitment).unwrap()).unwrap();
            assert_eq!(hex::encode(tweaked.as_bytes()), *expected);
        }
    }

    #[test]
    /**
        Two leaf script tree from
        https://github.com/bitcoin-core/btcdeb/blob/master/doc/tapscript-example.md
    */
    fn btcdeb_twoleaf_test() {
        let scripts = vec![
            hex::decode("029000b275209997a497d964fc1a62885b05a51166a65a90df00492c8d7cf61d6accf54803beac").unwrap(),
            hex::decode(
                "a8206c60f404f8167a38fc70eaf8aa17ac351023bef86bcb9d1086a19afe95bd533388204edfcf9dfe6c0b5c83d1ab3f78d1b39a46ebac6798e08e19761f5ed89ec83c10ac",
            )
            .unwrap(),
        ];

        assert_eq!(
            hex::encode(TapNode::leaf(scripts[0].clone()).hash()),
            "c81451874bd9ebd4b6fd4bba1f84cdfb533c532365d22a0a702205ff658b17c9"
        );
        assert_eq!(
            hex::encode(TapNode::leaf(scripts[1].clone()).hash()),
            "632c8632b4f29c6291416e23135cf78ecb82e525788ea5ed6483e3c6ce943b42"
        );

        let tree = TapNode::from_scripts(&scripts).unwrap();
        let root = tree.hash();
        assert_eq!(
            hex::encode(root),
            "41646f8c1fe2a96ddad7f5471bc4fee7da98794ef8c45a4f4fc6a559d60c9f6b"
        );

        let internal = h32("5bf08d58a430f8c222bffaf9127249c5cdff70a2d68b2b45637eb662b6b88eb5");
        let (tweaked, odd) = tweak_public_key(&internal, &root).unwrap();
        assert_eq!(
            hex::encode(tweaked),
            "f128a8a8a636e19f00a80169550fedfc26b6f5dd04d935ec452894aad938ef0c"
        );
        assert!(odd);
    }

    #[test]
    fn branch_order_and_pruned_nodes() {
        let a = TapNode::leaf(vec![0x51]);
        let b = TapNode::leaf(vec![0x52]);
        let ab = TapNode::branch(a.clone(), b.clone());
        assert_eq!(ab.hash(), TapNode::branch(b.clone(), a.clone()).hash());
        assert_eq!(ab.hash(), TapNode::branch(TapNode::Hash(a.hash()), b.clone()).hash());
        assert!(a.is_leaf() && !ab.is_leaf());

        // three scripts: (a, b) paired, c carried up and paired with the branch
        let c = TapNode::leaf(vec![0x53]);
        let tree = TapNode::from_scripts(&[vec![0x51], vec![0x52], vec![0x53]]).unwrap();
        assert_eq!(tree, TapNode::branch(ab, c));

        assert_eq!(TapNode::from_scripts(&[]), None);
        assert_eq!(TapNode::from_scripts(&[vec![0x51]]), Some(a));
    }

    #[test]
    fn nums_point_matches_bip341() {
        assert_eq!(
            hex::encode(nums_point().unwrap()),
            "50929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0"
        );
    }

    #[test]
    fn tweaked_keys_stay_paired() {
        let mut rng = thread_rng();
        for i in 0..16 {
            let key = PrivateKey::new_rand(&mut rng);
            let mut commitment = vec![0u8; 32];
            rng.fill_bytes(&mut commitment);
            if i % 4 == 0 {
                commitment.clear();
            }

            let tweaked_key = tweak_private_key(&key, &commitment).unwrap();
            let (tweaked_pub, odd) = tweak_public_key(&key.public_key().x_only_bytes(), &commitment).unwrap();
            assert_eq!(tweaked_key.public_key().x_only_bytes(), tweaked_pub);
            assert_eq!(tweaked_key.public_key().has_even_y(), !odd);

            let message = [i as u8; 32];
            let signature = sign_schnorr(&tweaked_key, &message, &[0u8; 32]).unwrap();
            assert!(verify_schnorr(&tweaked_pub, &message, &signature));
        }
    }

    #[test]
    fn public_tweak_matches_libsecp256k1() {
        let secp = Secp256k1::new();
        let mut rng = thread_rng();
        for _ in 0..8 {
            let key = PrivateKey::new_rand(&mut rng);
            let internal = key.public_key().x_only_bytes();
            let mut commitment = [0u8; 32];
            rng.fill_bytes(&mut commitment);

            let t = TapTweakHash::hash(&[&internal, &commitment]);
            let secp_key = secp256k1::XOnlyPublicKey::from_slice(&internal).unwrap();
            let secp_tweak = secp256k1::Scalar::from_be_bytes(t).unwrap();
            let (expected, parity) = secp_key.add_tweak(&secp, &secp_tweak).unwrap();

            let (tweaked, odd) = tweak_public_key(&internal, &commitment).unwrap();
            assert_eq!(tweaked, expected.serialize());
            assert_eq!(odd, parity == secp256k1::Parity::Odd);
        }
    }

    #[test]
    fn rejects_keys_off_the_curve() {
        // x = 5 has no point on secp256k1
        let mut x = [0u8; 32];
        x[31] = 5;
        assert_eq!(
            tweak_public_key(&x, &[]),
            Err(TaprootError::Curve(CurveError::NotOnCurve))
        );
    }
}
