//! The Adobe Standard Encoding.
//!
//! Seac composition addresses its base and accent components as character
//! codes in this encoding; the interpreter maps them to glyph names and
//! resolves the names through the program environment.

/// Glyph name for `code` in the Adobe Standard Encoding, or `None` for an
/// unencoded position.
pub fn standard_encoding(code: i32) -> Option<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|i| STANDARD_ENCODING.get(i))
        .copied()
        .flatten()
}

/// The Adobe Standard Encoding vector. Unencoded positions are `None`.
pub static STANDARD_ENCODING: [Option<&str>; 256] = {
    let mut table: [Option<&str>; 256] = [None; 256];
    table[32] = Some("space");
    table[33] = Some("exclam");
    table[34] = Some("quotedbl");
    table[35] = Some("numbersign");
    table[36] = Some("dollar");
    table[37] = Some("percent");
    table[38] = Some("ampersand");
    table[39] = Some("quoteright");
    table[40] = Some("parenleft");
    table[41] = Some("parenright");
    table[42] = Some("asterisk");
    table[43] = Some("plus");
    table[44] = Some("comma");
    table[45] = Some("hyphen");
    table[46] = Some("period");
    table[47] = Some("slash");
    table[48] = Some("zero");
    table[49] = Some("one");
    table[50] = Some("two");
    table[51] = Some("three");
    table[52] = Some("four");
    table[53] = Some("five");
    table[54] = Some("six");
    table[55] = Some("seven");
    table[56] = Some("eight");
    table[57] = Some("nine");
    table[58] = Some("colon");
    table[59] = Some("semicolon");
    table[60] = Some("less");
    table[61] = Some("equal");
    table[62] = Some("greater");
    table[63] = Some("question");
    table[64] = Some("at");
    table[65] = Some("A");
    table[66] = Some("B");
    table[67] = Some("C");
    table[68] = Some("D");
    table[69] = Some("E");
    table[70] = Some("F");
    table[71] = Some("G");
    table[72] = Some("H");
    table[73] = Some("I");
    table[74] = Some("J");
    table[75] = Some("K");
    table[76] = Some("L");
    table[77] = Some("M");
    table[78] = Some("N");
    table[79] = Some("O");
    table[80] = Some("P");
    table[81] = Some("Q");
    table[82] = Some("R");
    table[83] = Some("S");
    table[84] = Some("T");
    table[85] = Some("U");
    table[86] = Some("V");
    table[87] = Some("W");
    table[88] = Some("X");
    table[89] = Some("Y");
    table[90] = Some("Z");
    table[91] = Some("bracketleft");
    table[92] = Some("backslash");
    table[93] = Some("bracketright");
    table[94] = Some("asciicircum");
    table[95] = Some("underscore");
    table[96] = Some("quoteleft");
    table[97] = Some("a");
    table[98] = Some("b");
    table[99] = Some("c");
    table[100] = Some("d");
    table[101] = Some("e");
    table[102] = Some("f");
    table[103] = Some("g");
    table[104] = Some("h");
    table[105] = Some("i");
    table[106] = Some("j");
    table[107] = Some("k");
    table[108] = Some("l");
    table[109] = Some("m");
    table[110] = Some("n");
    table[111] = Some("o");
    table[112] = Some("p");
    table[113] = Some("q");
    table[114] = Some("r");
    table[115] = Some("s");
    table[116] = Some("t");
    table[117] = Some("u");
    table[118] = Some("v");
    table[119] = Some("w");
    table[120] = Some("x");
    table[121] = Some("y");
    table[122] = Some("z");
    table[123] = Some("braceleft");
    table[124] = Some("bar");
    table[125] = Some("braceright");
    table[126] = Some("asciitilde");
    table[161] = Some("exclamdown");
    table[162] = Some("cent");
    table[163] = Some("sterling");
    table[164] = Some("fraction");
    table[165] = Some("yen");
    table[166] = Some("florin");
    table[167] = Some("section");
    table[168] = Some("currency");
    table[169] = Some("quotesingle");
    table[170] = Some("quotedblleft");
    table[171] = Some("guillemotleft");
    table[172] = Some("guilsinglleft");
    table[173] = Some("guilsinglright");
    table[174] = Some("fi");
    table[175] = Some("fl");
    table[177] = Some("endash");
    table[178] = Some("dagger");
    table[179] = Some("daggerdbl");
    table[180] = Some("periodcentered");
    table[182] = Some("paragraph");
    table[183] = Some("bullet");
    table[184] = Some("quotesinglbase");
    table[185] = Some("quotedblbase");
    table[186] = Some("quotedblright");
    table[187] = Some("guillemotright");
    table[188] = Some("ellipsis");
    table[189] = Some("perthousand");
    table[191] = Some("questiondown");
    table[193] = Some("grave");
    table[194] = Some("acute");
    table[195] = Some("circumflex");
    table[196] = Some("tilde");
    table[197] = Some("macron");
    table[198] = Some("breve");
    table[199] = Some("dotaccent");
    table[200] = Some("dieresis");
    table[202] = Some("ring");
    table[203] = Some("cedilla");
    table[205] = Some("hungarumlaut");
    table[206] = Some("ogonek");
    table[207] = Some("caron");
    table[208] = Some("emdash");
    table[225] = Some("AE");
    table[227] = Some("ordfeminine");
    table[232] = Some("Lslash");
    table[233] = Some("Oslash");
    table[234] = Some("OE");
    table[235] = Some("ordmasculine");
    table[241] = Some("ae");
    table[245] = Some("dotlessi");
    table[248] = Some("lslash");
    table[249] = Some("oslash");
    table[250] = Some("oe");
    table[251] = Some("germandbls");
    table
};
