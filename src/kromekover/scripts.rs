//! Evasion scripts evaluated on every new document
//!
//! Each script reads its values from `window.__stealthConfig`, which is
//! installed first.

pub(super) const NAVIGATOR_WEBDRIVER: &str = r"
(() => {
    Object.defineProperty(Navigator.prototype, 'webdriver', { get: () => undefined, configurable: true });
})();
";

pub(super) const CDP_ARTIFACTS: &str = r"
(() => {
    for (const key of Object.keys(window)) {
        if (/^cdc_|^\$cdc_|^__webdriver/.test(key)) {
            try { delete window[key]; } catch (_) {}
        }
    }
})();
";

pub(super) const NAVIGATOR_IDENTITY: &str = r"
(() => {
    const cfg = window.__stealthConfig;
    Object.defineProperty(navigator, 'vendor', { get: () => 'Google Inc.' });
    Object.defineProperty(navigator, 'platform', { get: () => cfg.platform });
    Object.defineProperty(navigator, 'language', { get: () => cfg.languages[0] });
    Object.defineProperty(navigator, 'languages', { get: () => Object.freeze([...cfg.languages]) });
    Object.defineProperty(navigator, 'hardwareConcurrency', { get: () => cfg.hardwareConcurrency });
})();
";

pub(super) const NAVIGATOR_PLUGINS: &str = r"
(() => {
    const pdf = { type: 'application/pdf', suffixes: 'pdf', description: 'Portable Document Format' };
    const names = ['PDF Viewer', 'Chrome PDF Viewer', 'Chromium PDF Viewer', 'Microsoft Edge PDF Viewer', 'WebKit built-in PDF'];
    const plugins = names.map((name) => ({
        name,
        filename: 'internal-pdf-viewer',
        description: 'Portable Document Format',
        length: 1,
        0: pdf,
    }));
    const list = Object.create(PluginArray.prototype);
    plugins.forEach((p, i) => { list[i] = p; list[p.name] = p; });
    Object.defineProperty(list, 'length', { get: () => plugins.length });
    list.item = (i) => plugins[i] || null;
    list.namedItem = (n) => plugins.find((p) => p.name === n) || null;
    list.refresh = () => {};
    Object.defineProperty(navigator, 'plugins', { get: () => list });
})();
";

pub(super) const NAVIGATOR_PERMISSIONS: &str = r"
(() => {
    if (!window.navigator.permissions) return;
    const query = window.navigator.permissions.query.bind(window.navigator.permissions);
    window.navigator.permissions.query = (params) =>
        params && params.name === 'notifications'
            ? Promise.resolve({ state: Notification.permission, onchange: null })
            : query(params);
})();
";

pub(super) const CHROME_RUNTIME: &str = r"
(() => {
    if (!window.chrome) {
        Object.defineProperty(window, 'chrome', { value: {}, writable: true, configurable: true });
    }
    if (!window.chrome.runtime) {
        window.chrome.runtime = {
            connect: () => ({
                onMessage: { addListener: () => {}, removeListener: () => {} },
                postMessage: () => {},
                disconnect: () => {},
            }),
            sendMessage: () => {},
        };
    }
    if (!window.chrome.app) {
        window.chrome.app = {
            isInstalled: false,
            getDetails: () => null,
            getIsInstalled: () => false,
        };
    }
})();
";

pub(super) const WEBGL_VENDOR: &str = r"
(() => {
    const cfg = window.__stealthConfig;
    const handler = {
        apply(target, ctx, args) {
            const param = args && args[0];
            if (param === 37445) return cfg.webglVendor;
            if (param === 37446) return cfg.webglRenderer;
            return Reflect.apply(target, ctx, args);
        },
    };
    for (const ctor of [window.WebGLRenderingContext, window.WebGL2RenderingContext]) {
        if (ctor) {
            ctor.prototype.getParameter = new Proxy(ctor.prototype.getParameter, handler);
        }
    }
})();
";

pub(super) const SCREEN_METRICS: &str = r"
(() => {
    const cfg = window.__stealthConfig;
    Object.defineProperty(window.screen, 'width', { get: () => cfg.screenWidth });
    Object.defineProperty(window.screen, 'height', { get: () => cfg.screenHeight });
    Object.defineProperty(window.screen, 'availWidth', { get: () => cfg.screenWidth });
    Object.defineProperty(window.screen, 'availHeight', { get: () => cfg.screenHeight - 40 });
    if (window.outerWidth === 0) {
        Object.defineProperty(window, 'outerWidth', { get: () => window.innerWidth });
        Object.defineProperty(window, 'outerHeight', { get: () => window.innerHeight + 85 });
    }
})();
";

pub(super) const CANVAS_NOISE: &str = r"
(() => {
    const seed = window.__stealthConfig.canvasSeed || '';
    let state = 0;
    for (let i = 0; i < seed.length; i++) {
        state = (state * 31 + seed.charCodeAt(i)) >>> 0;
    }
    const perturb = (data) => {
        let s = state;
        for (let i = 0; i < data.length; i += 64) {
            s = (s * 1103515245 + 12345) >>> 0;
            data[i] = data[i] ^ (s & 1);
        }
    };
    const getImageData = CanvasRenderingContext2D.prototype.getImageData;
    CanvasRenderingContext2D.prototype.getImageData = function (...args) {
        const image = getImageData.apply(this, args);
        perturb(image.data);
        return image;
    };
    const toDataURL = HTMLCanvasElement.prototype.toDataURL;
    HTMLCanvasElement.prototype.toDataURL = function (...args) {
        const ctx = this.getContext('2d');
        if (ctx && this.width > 0 && this.height > 0) {
            const image = getImageData.call(ctx, 0, 0, this.width, this.height);
            perturb(image.data);
            ctx.putImageData(image, 0, 0);
        }
        return toDataURL.apply(this, args);
    };
})();
";
