/*
    Points on secp256k1: y^2 = x^3 + 7 over the base field.

    The public `Point` type is affine (or the identity). Group operations run
    internally on Jacobian coordinates (X, Y, Z) representing (X/Z^2, Y/Z^3),
    which avoids a field inversion for every addition.

    Serialized forms:
        - 65 bytes: 0x04 || x || y
        - 33 bytes: 0x02 (even y) or 0x03 (odd y) || x
        - 32 bytes: x only, the point with even y is implied (BIP340)
*/
use super::field::FieldElement;
use super::scalar::Scalar;
use crate::error::CurveError;

const GENERATOR_X: FieldElement = FieldElement::from_limbs_unchecked([
    0x59F2_815B_16F8_1798,
    0x029B_FCDB_2DCE_28D9,
    0x55A0_6295_CE87_0B07,
    0x79BE_667E_F9DC_BBAC,
]);

const GENERATOR_Y: FieldElement = FieldElement::from_limbs_unchecked([
    0x9C47_D08F_FB10_D4B8,
    0xFD17_B448_A685_5419,
    0x5DA4_FBFC_0E11_08A8,
    0x483A_DA77_26A3_C465,
]);

const CURVE_B: u64 = 7;

pub const UNCOMPRESSED_PREFIX: u8 = 0x04;
pub const EVEN_PREFIX: u8 = 0x02;
pub const ODD_PREFIX: u8 = 0x03;

/// Serialization formats understood by `Point::serialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointEncoding {
    Uncompressed,
    Compressed,
    XOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    Infinity,
    Affine { x: FieldElement, y: FieldElement },
}

impl Point {
    pub fn generator() -> Self {
        Point::Affine { x: GENERATOR_X, y: GENERATOR_Y }
    }

    /**
        Builds a point from coordinates, checking the curve equation.
    */
    pub fn from_affine(x: FieldElement, y: FieldElement) -> Result<Self, CurveError> {
        if y.square() != curve_rhs(&x) {
            return Err(CurveError::NotOnCurve);
        }
        Ok(Point::Affine { x, y })
    }

    /**
        BIP340 lift_x: the unique point with the given x coordinate and an even y.
    */
    pub fn lift_x(x_bytes: &[u8; 32]) -> Result<Self, CurveError> {
        let x = FieldElement::from_bytes(x_bytes).ok_or(CurveError::NotOnCurve)?;
        let y = curve_rhs(&x).sqrt().ok_or(CurveError::NotOnCurve)?;
        let y = if y.is_odd() { -y } else { y };
        Ok(Point::Affine { x, y })
    }

    /**
        Decodes any of the three serialized forms, chosen by length.
    */
    pub fn deserialize(bytes: &[u8]) -> Result<Self, CurveError> {
        match bytes.len() {
            65 => {
                if bytes[0] != UNCOMPRESSED_PREFIX {
                    return Err(CurveError::InvalidPrefix(bytes[0]));
                }
                let x = coordinate(&bytes[1..33])?;
                let y = coordinate(&bytes[33..65])?;
                Point::from_affine(x, y)
            }
            33 => {
                let odd = match bytes[0] {
                    EVEN_PREFIX => false,
                    ODD_PREFIX => true,
                    other => return Err(CurveError::InvalidPrefix(other)),
                };
                let mut x_bytes = [0u8; 32];
                x_bytes.copy_from_slice(&bytes[1..]);
                let point = Point::lift_x(&x_bytes)?;
                Ok(if odd { point.negate() } else { point })
            }
            32 => {
                let mut x_bytes = [0u8; 32];
                x_bytes.copy_from_slice(bytes);
                Point::lift_x(&x_bytes)
            }
            len => Err(CurveError::InvalidLength(len)),
        }
    }

    /**
        Serializes the point. The identity has no encoding.
    */
    pub fn serialize(&self, encoding: PointEncoding) -> Result<Vec<u8>, CurveError> {
        let (x, y) = self.coordinates().ok_or(CurveError::PointAtInfinity)?;
        let mut out = Vec::with_capacity(65);
        match encoding {
            PointEncoding::Uncompressed => {
                out.push(UNCOMPRESSED_PREFIX);
                out.extend_from_slice(&x.to_bytes());
                out.extend_from_slice(&y.to_bytes());
            }
            PointEncoding::Compressed => {
                out.push(if y.is_odd() { ODD_PREFIX } else { EVEN_PREFIX });
                out.extend_from_slice(&x.to_bytes());
            }
            PointEncoding::XOnly => out.extend_from_slice(&x.to_bytes()),
        }
        Ok(out)
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    pub fn coordinates(&self) -> Option<(FieldElement, FieldElement)> {
        match self {
            Point::Infinity => None,
            Point::Affine { x, y } => Some((*x, *y)),
        }
    }

    pub fn x(&self) -> Option<FieldElement> {
        self.coordinates().map(|(x, _)| x)
    }

    /// False for the identity.
    pub fn has_even_y(&self) -> bool {
        matches!(self, Point::Affine { y, .. } if !y.is_odd())
    }

    pub fn negate(&self) -> Self {
        match self {
            Point::Infinity => Point::Infinity,
            Point::Affine { x, y } => Point::Affine { x: *x, y: -*y },
        }
    }

    pub fn add(&self, other: &Point) -> Point {
        Jacobian::from(*self).add(&Jacobian::from(*other)).to_affine()
    }

    /// k * self
    pub fn mul(&self, k: &Scalar) -> Point {
        Jacobian::from(*self).mul(k).to_affine()
    }

    /// k * G
    pub fn mul_generator(k: &Scalar) -> Point {
        Point::generator().mul(k)
    }

    /**
        Computes a * G + b * self, the combination used by both verifiers.
    */
    pub fn mul_add_generator(&self, a: &Scalar, b: &Scalar) -> Point {
        let ag = Jacobian::from(Point::generator()).mul(a);
        let bp = Jacobian::from(*self).mul(b);
        ag.add(&bp).to_affine()
    }
}

fn curve_rhs(x: &FieldElement) -> FieldElement {
    x.square() * *x + FieldElement::from_u64(CURVE_B)
}

fn coordinate(bytes: &[u8]) -> Result<FieldElement, CurveError> {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(bytes);
    FieldElement::from_bytes(&buf).ok_or(CurveError::NotOnCurve)
}

// Z == 0 marks the identity.
#[derive(Clone, Copy, Debug)]
struct Jacobian {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl Jacobian {
    const INFINITY: Jacobian = Jacobian {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn double(&self) -> Jacobian {
        if self.is_infinity() || self.y.is_zero() {
            return Jacobian::INFINITY;
        }
        let y2 = self.y.square();
        let s = (self.x * y2).double().double();
        let m = self.x.square() * FieldElement::from_u64(3);
        let x3 = m.square() - s.double();
        let y4_8 = y2.square().double().double().double();
        let y3 = m * (s - x3) - y4_8;
        let z3 = (self.y * self.z).double();
        Jacobian { x: x3, y: y3, z: z3 }
    }

    fn add(&self, other: &Jacobian) -> Jacobian {
        if self.is_infinity() {
            return *other;
        }
        if other.is_infinity() {
            return *self;
        }
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        let s1 = self.y * other.z * z2z2;
        let s2 = other.y * self.z * z1z1;
        let h = u2 - u1;
        let r = s2 - s1;
        if h.is_zero() {
            return if r.is_zero() { self.double() } else { Jacobian::INFINITY };
        }
        let h2 = h.square();
        let h3 = h2 * h;
        let u1h2 = u1 * h2;
        let x3 = r.square() - h3 - u1h2.double();
        let y3 = r * (u1h2 - x3) - s1 * h3;
        let z3 = h * self.z * other.z;
        Jacobian { x: x3, y: y3, z: z3 }
    }

    // Montgomery ladder over all 256 bits of k. r1 - r0 == self throughout.
    fn mul(&self, k: &Scalar) -> Jacobian {
        let mut r0 = Jacobian::INFINITY;
        let mut r1 = *self;
        for i in (0..256).rev() {
            if k.bit(i) {
                r0 = r0.add(&r1);
                r1 = r1.double();
            } else {
                r1 = r0.add(&r1);
                r0 = r0.double();
            }
        }
        r0
    }

    fn to_affine(&self) -> Point {
        let z_inv = match self.z.invert() {
            Some(z_inv) => z_inv,
            None => return Point::Infinity,
        };
        let z_inv2 = z_inv.square();
        Point::Affine {
            x: self.x * z_inv2,
            y: self.y * z_inv2 * z_inv,
        }
    }
}

impl From<Point> for Jacobian {
    fn from(point: Point) -> Self {
        match point {
            Point::Infinity => Jacobian::INFINITY,
            Point::Affine { x, y } => Jacobian { x, y, z: FieldElement::ONE },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, RngCore};
    use secp256k1::{PublicKey, Secp256k1, SecretKey};

    fn x_bytes(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn generator_serializations() {
        let g = Point::generator();
        assert_eq!(
            hex::encode(g.serialize(PointEncoding::Compressed).unwrap()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(g.serialize(PointEncoding::Uncompressed).unwrap()),
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
        assert_eq!(g.serialize(PointEncoding::XOnly).unwrap().len(), 32);
        assert_eq!(
            Point::Infinity.serialize(PointEncoding::Compressed),
            Err(CurveError::PointAtInfinity)
        );
    }

    #[test]
    fn deserialize_all_forms() {
        let g = Point::generator();
        for encoding in [PointEncoding::Uncompressed, PointEncoding::Compressed, PointEncoding::XOnly] {
            let bytes = g.serialize(encoding).unwrap();
            assert_eq!(Point::deserialize(&bytes).unwrap(), g);
        }

        let neg = g.negate();
        let compressed = neg.serialize(PointEncoding::Compressed).unwrap();
        assert_eq!(compressed[0], ODD_PREFIX);
        assert_eq!(Point::deserialize(&compressed).unwrap(), neg);
    }

    #[test]
    fn deserialize_rejects_bad_input() {
        let mut bytes = Point::generator().serialize(PointEncoding::Compressed).unwrap();
        bytes[0] = 0x05;
        assert_eq!(Point::deserialize(&bytes), Err(CurveError::InvalidPrefix(0x05)));

        let mut bytes = Point::generator().serialize(PointEncoding::Uncompressed).unwrap();
        bytes[64] ^= 1;
        assert_eq!(Point::deserialize(&bytes), Err(CurveError::NotOnCurve));

        assert_eq!(Point::deserialize(&[0x02; 20]), Err(CurveError::InvalidLength(20)));
        assert_eq!(Point::deserialize(&[]), Err(CurveError::InvalidLength(0)));
    }

    #[test]
    fn lift_x_picks_even_root() {
        let p = Point::lift_x(&x_bytes("f722f5f1dfdb41951882ea19dcb520bcb5ad1f529da3b209eebfc1211674e39a")).unwrap();
        let (_, y) = p.coordinates().unwrap();
        assert_eq!(
            hex::encode(y.to_bytes()),
            "07de0c7c747fea6a923018ebec44fd2e0b6ef82921fff1ae5fc5b3669698739e"
        );

        let p = Point::lift_x(&x_bytes("be5e1afe40a8b4019213ec9d3b562456113197eb64bf43438170bd32dc29ead2")).unwrap();
        let (_, y) = p.coordinates().unwrap();
        assert_eq!(
            hex::encode(y.to_bytes()),
            "7b4786f12502e181ce71d75085493fca2e586cceeaaaed6a0e3c96607dfb55c2"
        );
        assert!(p.has_even_y());
    }

    #[test]
    fn lift_x_rejects_non_curve_x() {
        // no point has this x coordinate
        let x = x_bytes("eefdea4cdb677750a420fee807eacf21eb9898ae79b9768766e4faa04a2d4a34");
        assert_eq!(Point::lift_x(&x), Err(CurveError::NotOnCurve));
        // x >= p
        let x = x_bytes("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc30");
        assert_eq!(Point::lift_x(&x), Err(CurveError::NotOnCurve));
    }

    #[test]
    fn group_law() {
        let g = Point::generator();
        let two_g = g.add(&g);
        let three_g = two_g.add(&g);
        assert_eq!(Point::mul_generator(&Scalar::from_u64(2)), two_g);
        assert_eq!(Point::mul_generator(&Scalar::from_u64(3)), three_g);
        assert_eq!(g.add(&g.negate()), Point::Infinity);
        assert_eq!(g.add(&Point::Infinity), g);
        assert_eq!(Point::mul_generator(&Scalar::ZERO), Point::Infinity);
        assert_eq!(Point::mul_generator(&-Scalar::ONE), g.negate());
    }

    #[test]
    fn known_multiple_of_generator() {
        // 3G, which is also the public key in BIP340 test vector 0
        let p = Point::mul_generator(&Scalar::from_u64(3));
        assert_eq!(
            hex::encode(p.serialize(PointEncoding::XOnly).unwrap()),
            "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9"
        );
    }

    #[test]
    fn mul_add_matches_separate_operations() {
        let a = Scalar::from_u64(11);
        let b = Scalar::from_u64(29);
        let q = Point::mul_generator(&Scalar::from_u64(5));
        let expected = Point::mul_generator(&Scalar::from_u64(11 + 29 * 5));
        assert_eq!(q.mul_add_generator(&a, &b), expected);
    }

    #[test]
    fn random_points_round_trip() {
        let secp = Secp256k1::new();
        let mut rng = thread_rng();
        for _ in 0..16 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let d = Scalar::from_bytes_reduced(&bytes);
            if d.is_zero() {
                continue;
            }
            let point = Point::mul_generator(&d);
            let expected = PublicKey::from_secret_key(&secp, &SecretKey::from_slice(&d.to_bytes()).unwrap());

            let uncompressed = point.serialize(PointEncoding::Uncompressed).unwrap();
            assert_eq!(uncompressed, expected.serialize_uncompressed().to_vec());
            assert_eq!(Point::deserialize(&uncompressed).unwrap(), point);

            let compressed = point.serialize(PointEncoding::Compressed).unwrap();
            assert_eq!(compressed, expected.serialize().to_vec());
            assert_eq!(Point::deserialize(&compressed).unwrap(), point);

            // x-only drops the parity, so it comes back with an even y
            let x_only = point.serialize(PointEncoding::XOnly).unwrap();
            assert_eq!(x_only, expected.x_only_public_key().0.serialize().to_vec());
            let lifted = Point::deserialize(&x_only).unwrap();
            assert!(lifted.has_even_y());
            if point.has_even_y() {
                assert_eq!(lifted, point);
            } else {
                assert_eq!(lifted, point.negate());
            }
        }
    }
}
