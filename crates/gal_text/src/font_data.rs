//! Embedded stroke font covering printable ASCII (`' '` to `'~'`)
//!
//! One string per glyph, indexed by `code - ' '`. Characters are read in
//! pairs offset by `'R'`: the first pair holds the left and right advance
//! bounds, every following pair is an `(x, y)` stroke point, and `" R"`
//! lifts the pen. `y` is measured down from `'R' + 10` (the baseline) on a
//! 21 unit cap height.

pub const BUILTIN_FONT: &[&str] = &[
    r"JZ", // space
    r"OURGRU RR[R\", // !
    r"MWPGPM RTGTM", // double quote
    r"JZPGN\ RVGT\ RLNXN RLUXU", // #
    r"KYWLTJPJMLMOPQTRWTWWTYPYMW RRGR\", // $
    r"I[K\YG RNGLILLNNPLPING RVUTWTZV\XZXWVU", // %
    r"I[Y\OMOIQGSGUIUKLTLYO\S\YU", // &
    r"OURGRM", // quote
    r"NVTERHQLQWR[T^", // (
    r"NVPERHSLSWR[P^", // )
    r"KYRGRS RMJWP RWJMP", // *
    r"I[RLRZ RKSYS", // +
    r"OUR[R]P`", // ,
    r"JZLSXS", // -
    r"OUR[R\", // .
    r"JZXEL^", // /
    r"KYRGOHMLMWO[R\U[WWWLUHRG", // 0
    r"KYOKRGR\", // 1
    r"KYMKOHRGUHWKWNM\W\", // 2
    r"KYMGWGROTOWQWYT\P\MZ", // 3
    r"KYTGLVXV RTGT\", // 4
    r"KYWGNGMPPOTOWRWYT\P\MZ", // 5
    r"KYVHSGPHMMMWO[R\U[WWWUUQRPOQMU", // 6
    r"KYMGWGP\", // 7
    r"KYRQNOMLNHRGVHWLVORQNSMWMYO[R\U[WYWWVSRQ", // 8
    r"KYWNURRSORMNMLOHRGUHWLWVT[Q\N[", // 9
    r"OURNRO RR[R\", // :
    r"OURNRO RR[R]P`", // ;
    r"I[YJKSY\", // <
    r"I[KPYP RKVYV", // =
    r"I[KJYSK\", // >
    r"KYMKOHRGUHWKWMUPRRRU RR[R\", // ?
    r"H\VSUPROPPOSOUPWRXUWVU RVOVWWXYWZTZPXKTHPHLKJPJULZP]U]Y[", // @
    r"I[K\RGY\ RNTVT", // A
    r"JZL\LGUGXIXOUQLQ RUQXSXZU\L\", // B
    r"JZXKWHTGRGPHNKLNLQLUNXO[R\T\W[XX", // C
    r"JZL\LGSGWJXOXTWYS\L\", // D
    r"JZXGLGL\X\ RLQUQ", // E
    r"JZXGLGL\ RLQUQ", // F
    r"JZXKWHTGRGPHNKLNLQLUNXO[R\T\W[XXZUXTST", // G
    r"JZL\LG RX\XG RLQXQ", // H
    r"OUR\RG", // I
    r"KYVGVWT[R\P\N[MX", // J
    r"JZL\LG RXGLU RPQX\", // K
    r"JYLGL\W\", // L
    r"I[K\KGRWYGY\", // M
    r"JZL\LGX\XG", // N
    r"I[YRYNXKVITHRGPHNILKKNKQKULXNZP[R\T[VZXXYUYR", // O
    r"JZL\LGUGXIXPURLR", // P
    r"I[YRYNXKVITHRGPHNILKKNKQKULXNZP[R\T[VZXXYUYR RTXY]", // Q
    r"JZL\LGUGXIXPURLR RSRX\", // R
    r"JZXJUGOGLJLNOQURXUXYU\O\LY", // S
    r"JZKGYG RRGR\", // T
    r"JZLGLWN[Q\S\V[XWXG", // U
    r"I[KGR\YG", // V
    r"G]IGM\RLW\[G", // W
    r"JZLGX\ RXGL\", // X
    r"I[KGRRYG RRRR\", // Y
    r"JZLGXGL\X\", // Z
    r"NVTEPEP^T^", // [
    r"JZLEX^", // backslash
    r"NVPETET^P^", // ]
    r"KYMMRGWM", // ^
    r"I[K_Y_", // _
    r"OUQGSK", // grave
    r"KYWNW\ RWQTNPNMQMYP\T\WY", // a
    r"KYMGM\ RMQPNTNWQWYT\P\MY", // b
    r"KYWQTNPNMQMYP\T\WY", // c
    r"KYWGW\ RWQTNPNMQMYP\T\WY", // d
    r"KYMUWUWRUORNOOMRMXO[R\U\WZ", // e
    r"LWVGSGQIQ\ RNNUN", // f
    r"KYWNW_UbRcOb RWQTNPNMQMYP\T\WY", // g
    r"KYMGM\ RMRPNTNWQW\", // h
    r"OURNR\ RRIRH", // i
    r"MURNR`QbOc RRIRH", // j
    r"KYMGM\ RWNMX RQUW\", // k
    r"OVRGRZS\T\", // l
    r"I[KNK\ RKQMNPNRQR\ RRQTNWNYQY\", // m
    r"KYMNM\ RMRPNTNWQW\", // n
    r"KYPNMQMYP\T\WYWQTNPN", // o
    r"KYMNMc RMQPNTNWQWYT\P\MY", // p
    r"KYWNWc RWQTNPNMQMYP\T\WY", // q
    r"LXNNN\ RNSQOTNVN", // r
    r"KYWPTNPNMPMSPUTUWWWZT\P\MZ", // s
    r"LWQIQZS\U\ RNNUN", // t
    r"KYMNMYP\T\WX RWNW\", // u
    r"KYMNR\WN", // v
    r"I[KNN\RQV\YN", // w
    r"KYMNW\ RWNM\", // x
    r"KYMNR\ RWNR\PaNc", // y
    r"KYMNWNM\W\", // z
    r"MVTERFQHQOORQUQ\R^T_", // {
    r"OURER_", // |
    r"NWPERFSHSOURSUS\R^P_", // }
    r"JZLTNQPQTTVTXQ", // ~
];
